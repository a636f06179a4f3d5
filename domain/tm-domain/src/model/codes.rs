//! ネイティブ列挙値（TASK_STATE / TASK_TRIGGER_TYPE2 など）
//!
//! 値はすべて taskschd.h の定義と一致させること。
//! ネイティブ側はこの整数でディスパッチするため、ずれると登録や取得が黙って壊れる。

use crate::error::DomainError;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// 隠しタスクも列挙する（GetTasks / GetRunningTasks の flags）
pub const TASK_ENUM_HIDDEN: i32 = 1;

/// ネイティブの整数コードと 1:1 に対応する列挙型を定義する。
macro_rules! native_code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// エラー表示用の種別名
            pub const KIND: &'static str = $kind;

            pub const fn as_i32(self) -> i32 {
                self as i32
            }

            pub fn from_i32(value: i32) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// 未知のコードは UnknownCode として返す
            pub fn try_from_i32(value: i32) -> Result<Self, DomainError> {
                Self::from_i32(value).ok_or(DomainError::UnknownCode { kind: $kind, value })
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            pub fn from_str(value: &str) -> Option<Self> {
                match value {
                    $( $label => Some(Self::$variant), )+
                    _ => None,
                }
            }

            pub fn all() -> &'static [Self] {
                &[ $( Self::$variant, )+ ]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

native_code_enum! {
    /// 登録済みタスクの状態（TASK_STATE）
    #[derive(Default)]
    pub enum TaskState: "task state" {
        #[default]
        Unknown = 0 => "Unknown",
        Disabled = 1 => "Disabled",
        Queued = 2 => "Queued",
        Ready = 3 => "Ready",
        Running = 4 => "Running",
    }
}

native_code_enum! {
    /// 実行特権レベル（TASK_RUNLEVEL_TYPE）
    #[derive(Default)]
    pub enum RunLevel: "run level" {
        #[default]
        Lua = 0 => "Lua",
        Highest = 1 => "Highest",
    }
}

native_code_enum! {
    /// アクション種別（TASK_ACTION_TYPE）
    pub enum ActionType: "action type" {
        Exec = 0 => "Exec",
        ComHandler = 5 => "ComHandler",
        SendEmail = 6 => "SendEmail",
        ShowMessage = 7 => "ShowMessage",
    }
}

native_code_enum! {
    /// ログオン方式（TASK_LOGON_TYPE）
    #[derive(Default)]
    pub enum LogonType: "logon type" {
        #[default]
        None = 0 => "None",
        Password = 1 => "Password",
        S4u = 2 => "S4U",
        InteractiveToken = 3 => "InteractiveToken",
        Group = 4 => "Group",
        ServiceAccount = 5 => "ServiceAccount",
        InteractiveTokenOrPassword = 6 => "InteractiveTokenOrPassword",
    }
}

native_code_enum! {
    /// 互換性レベル（TASK_COMPATIBILITY）
    #[derive(Default)]
    pub enum Compatibility: "compatibility" {
        At = 0 => "AT",
        V1 = 1 => "V1",
        #[default]
        V2 = 2 => "V2",
        V2_1 = 3 => "V2_1",
        V2_2 = 4 => "V2_2",
        V2_3 = 5 => "V2_3",
        V2_4 = 6 => "V2_4",
    }
}

native_code_enum! {
    /// 多重起動時の扱い（TASK_INSTANCES_POLICY）
    #[derive(Default)]
    pub enum InstancesPolicy: "instances policy" {
        Parallel = 0 => "Parallel",
        Queue = 1 => "Queue",
        #[default]
        IgnoreNew = 2 => "IgnoreNew",
        StopExisting = 3 => "StopExisting",
    }
}

native_code_enum! {
    /// トリガー種別（TASK_TRIGGER_TYPE2）。10 は欠番。
    pub enum TriggerType: "trigger type" {
        Event = 0 => "Event",
        Time = 1 => "Time",
        Daily = 2 => "Daily",
        Weekly = 3 => "Weekly",
        Monthly = 4 => "Monthly",
        MonthlyDow = 5 => "MonthlyDOW",
        Idle = 6 => "Idle",
        Registration = 7 => "Registration",
        Boot = 8 => "Boot",
        Logon = 9 => "Logon",
        SessionStateChange = 11 => "SessionStateChange",
        Custom = 12 => "Custom",
    }
}

native_code_enum! {
    /// セッション状態変化の理由（TASK_SESSION_STATE_CHANGE_TYPE）。5, 6 は欠番。
    #[derive(Default)]
    pub enum SessionStateChange: "session state change" {
        #[default]
        ConsoleConnect = 1 => "ConsoleConnect",
        ConsoleDisconnect = 2 => "ConsoleDisconnect",
        RemoteConnect = 3 => "RemoteConnect",
        RemoteDisconnect = 4 => "RemoteDisconnect",
        SessionLock = 7 => "SessionLock",
        SessionUnlock = 8 => "SessionUnlock",
    }
}

/// RegisterTaskDefinition の flags（TASK_CREATION）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TaskCreationFlags(i32);

impl TaskCreationFlags {
    pub const VALIDATE_ONLY: Self = Self(0x01);
    pub const CREATE: Self = Self(0x02);
    pub const UPDATE: Self = Self(0x04);
    pub const CREATE_OR_UPDATE: Self = Self(0x06);
    pub const DISABLE: Self = Self(0x08);
    pub const DONT_ADD_PRINCIPAL_ACE: Self = Self(0x10);
    pub const IGNORE_REGISTRATION_TRIGGERS: Self = Self(0x20);

    /// 名前付きフラグ一覧（表示用）
    pub const NAMED: [(&'static str, Self); 7] = [
        ("VALIDATE_ONLY", Self::VALIDATE_ONLY),
        ("CREATE", Self::CREATE),
        ("UPDATE", Self::UPDATE),
        ("CREATE_OR_UPDATE", Self::CREATE_OR_UPDATE),
        ("DISABLE", Self::DISABLE),
        ("DONT_ADD_PRINCIPAL_ACE", Self::DONT_ADD_PRINCIPAL_ACE),
        ("IGNORE_REGISTRATION_TRIGGERS", Self::IGNORE_REGISTRATION_TRIGGERS),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TaskCreationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TaskCreationFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
