//! Halcyon kernel-support utilities.
//!
//! Small freestanding building blocks the rest of the system leans on:
//! alignment arithmetic, a busy-wait mutex, one-shot init latches, and the
//! leveled logging front end. Everything here is `no_std` and allocation
//! free.

#![cfg_attr(not(test), no_std)]

pub mod alignment;
pub mod init_flag;
pub mod klog;
pub mod spinlock;

#[doc(hidden)]
pub use paste;

pub use alignment::{align_down_u64, align_down_usize, align_up_u64, align_up_usize};
pub use init_flag::InitFlag;
pub use klog::{KlogLevel, klog_get_level, klog_init, klog_register_backend, klog_set_level};
pub use spinlock::{SpinLock, SpinLockGuard};
