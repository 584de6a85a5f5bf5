//! Per-action request/response payloads
//!
//! | Action | Direction | Source |
//! |--------|-----------|--------|
//! | BatterySwap | CS -> CSMS | hand-written |
//! | BootNotification | CS -> CSMS | `ocpp_payload!` |
//! | ClearCache | CSMS -> CS | `ocpp_payload!` |
//! | DataTransfer | both | `ocpp_payload!` |
//! | Heartbeat | CS -> CSMS | `ocpp_payload!` |

mod battery_swap;
mod boot_notification;
mod clear_cache;
mod data_transfer;
mod heartbeat;

pub use battery_swap::{BatterySwap, BatterySwapRequest, BatterySwapResponse};
pub use boot_notification::{BootNotification, BootNotificationRequest, BootNotificationResponse};
pub use clear_cache::{ClearCache, ClearCacheRequest, ClearCacheResponse};
pub use data_transfer::{DataTransfer, DataTransferRequest, DataTransferResponse};
pub use heartbeat::{Heartbeat, HeartbeatRequest, HeartbeatResponse};

/// Names of every action this crate can parse.
pub const ACTIONS: &[&str] = &[
    "BatterySwap",
    "BootNotification",
    "ClearCache",
    "DataTransfer",
    "Heartbeat",
];
