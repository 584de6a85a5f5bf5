//! Enumerations shared by the covered actions.

use crate::ocpp_enum;

// ============================================================================
// Identification
// ============================================================================

ocpp_enum! {
    /// Kind of identification token.
    pub enum IdTokenKind: "id token type" {
        Central => "Central",
        EMaid => "eMAID",
        Iso14443 => "ISO14443",
        Iso15693 => "ISO15693",
        KeyCode => "KeyCode",
        Local => "Local",
        MacAddress => "MacAddress",
        NoAuthorization => "NoAuthorization",
    }
}

// ============================================================================
// Battery swapping
// ============================================================================

ocpp_enum! {
    /// Battery swap station event
    pub enum BatterySwapEvent: "battery swap event" {
        BatteryIn => "BatteryIn",
        BatteryOut => "BatteryOut",
        BatteryOutTimeout => "BatteryOutTimeout",
    }
}

// ============================================================================
// Provisioning
// ============================================================================

ocpp_enum! {
    /// Boot reason
    pub enum BootReason: "boot reason" {
        ApplicationReset => "ApplicationReset",
        FirmwareUpdate => "FirmwareUpdate",
        LocalReset => "LocalReset",
        PowerUp => "PowerUp",
        RemoteReset => "RemoteReset",
        ScheduledReset => "ScheduledReset",
        Triggered => "Triggered",
        Unknown => "Unknown",
        Watchdog => "Watchdog",
    }
}

ocpp_enum! {
    /// Registration status for BootNotification
    pub enum RegistrationStatus: "registration status" {
        Accepted => "Accepted",
        Pending => "Pending",
        Rejected => "Rejected",
    }
}

// ============================================================================
// Generic outcomes
// ============================================================================

ocpp_enum! {
    pub enum ClearCacheStatus: "clear cache status" {
        Accepted => "Accepted",
        Rejected => "Rejected",
    }
}

ocpp_enum! {
    pub enum DataTransferStatus: "data transfer status" {
        Accepted => "Accepted",
        Rejected => "Rejected",
        UnknownMessageId => "UnknownMessageId",
        UnknownVendorId => "UnknownVendorId",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_case_tokens() {
        assert_eq!("emaid".parse::<IdTokenKind>().unwrap(), IdTokenKind::EMaid);
        assert_eq!(IdTokenKind::EMaid.as_str(), "eMAID");
        assert_eq!("batteryin".parse::<BatterySwapEvent>().unwrap(), BatterySwapEvent::BatteryIn);
    }

    #[test]
    fn test_every_token_parses_back() {
        for reason in BootReason::ALL {
            assert_eq!(reason.as_str().parse::<BootReason>().unwrap(), *reason);
        }
    }
}
