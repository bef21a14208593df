//! Numeric message identifiers.

use std::fmt;

macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $id:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)+
            /// Identifier this crate does not model.
            Other(u32),
        }

        impl $name {
            /// Wire identifier.
            pub fn id(&self) -> u32 {
                match self {
                    $($name::$variant => $id,)+
                    $name::Other(id) => *id,
                }
            }

            /// Map a wire identifier; unknown values become `Other`.
            pub fn from_id(id: u32) -> Self {
                match id {
                    $($id => $name::$variant,)+
                    other => $name::Other(other),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $name::Other(id) => write!(f, "<{}>", id),
                    known => write!(f, "{:?}", known),
                }
            }
        }
    };
}

id_enum! {
    /// Request identifiers, including the vendor emergency dial.
    pub enum RequestKind {
        GetSimStatus = 1,
        GetCurrentCalls = 9,
        Dial = 10,
        Hangup = 12,
        LastCallFailCause = 18,
        SignalStrength = 19,
        VoiceRegistrationState = 20,
        DataRegistrationState = 21,
        Operator = 22,
        RadioPower = 23,
        Answer = 40,
        GetCellInfoList = 109,
        SetUnsolCellInfoListRate = 110,
        GetHardwareConfig = 124,
        GetRadioCapability = 130,
        GetActivityInfo = 135,
        DialEmergency = 10016,
    }
}

id_enum! {
    /// Unsolicited response identifiers, including vendor extensions.
    pub enum UnsolicitedKind {
        RadioStateChanged = 1000,
        CallStateChanged = 1001,
        NitzTimeReceived = 1008,
        SignalStrength = 1009,
        CdmaInfoRec = 1027,
        ImsNetworkStateChanged = 1036,
        DeviceReady = 11008,
        Am = 11010,
        WbAmrState = 11017,
        Handover = 11021,
    }
}
