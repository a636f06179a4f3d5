//! トリガー（タスクを起動する条件）
//!
//! 各バリアントは共通基底 `TaskTrigger`（ITrigger）を埋め込み、固有フィールドを追加する。
//! 判別子はバリアントから決まり、固有フィールドの値には依存しない。

use super::{DaysOfMonth, DaysOfWeek, MonthsOfYear, SessionStateChange, TriggerType, WeeksOfMonth};
use std::collections::BTreeMap;

/// 繰り返しパターン（IRepetitionPattern）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepetitionPattern {
    /// 繰り返しを続ける期間（例: "P1D"）
    pub duration: String,
    /// 繰り返し間隔（例: "PT5M"）
    pub interval: String,
    pub stop_at_duration_end: bool,
}

impl RepetitionPattern {
    /// いずれかの項目が既定値から変わっているか
    pub fn is_set(&self) -> bool {
        *self != Self::default()
    }
}

/// 全トリガー共通の基底フィールド（ITrigger）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTrigger {
    pub enabled: bool,
    pub end_boundary: String,
    pub execution_time_limit: String,
    pub id: String,
    pub repetition: RepetitionPattern,
    pub start_boundary: String,
}

impl Default for TaskTrigger {
    fn default() -> Self {
        Self {
            enabled: true, // ネイティブの既定値
            end_boundary: String::new(),
            execution_time_limit: String::new(),
            id: String::new(),
            repetition: RepetitionPattern::default(),
            start_boundary: String::new(),
        }
    }
}

impl TaskTrigger {
    /// 開始日時だけ指定した基底
    pub fn starting_at(start_boundary: impl Into<String>) -> Self {
        Self {
            start_boundary: start_boundary.into(),
            ..Self::default()
        }
    }
}

/// イベントログ購読（IEventTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventTrigger {
    pub base: TaskTrigger,
    pub delay: String,
    /// XPath クエリ（QueryList XML）
    pub subscription: String,
    /// 名前 → XPath。タスクへの引数として渡される。
    pub value_queries: BTreeMap<String, String>,
}

/// 指定時刻に1回（ITimeTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeTrigger {
    pub base: TaskTrigger,
    pub random_delay: String,
}

/// 毎日（IDailyTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyTrigger {
    pub base: TaskTrigger,
    pub days_interval: i16,
    pub random_delay: String,
}

/// 毎週（IWeeklyTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeeklyTrigger {
    pub base: TaskTrigger,
    pub days_of_week: DaysOfWeek,
    pub weeks_interval: i16,
    pub random_delay: String,
}

/// 毎月・日付指定（IMonthlyTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthlyTrigger {
    pub base: TaskTrigger,
    pub days_of_month: DaysOfMonth,
    pub months_of_year: MonthsOfYear,
    pub run_on_last_day_of_month: bool,
    pub random_delay: String,
}

/// 毎月・第n曜日指定（IMonthlyDOWTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthlyDowTrigger {
    pub base: TaskTrigger,
    pub days_of_week: DaysOfWeek,
    pub weeks_of_month: WeeksOfMonth,
    pub months_of_year: MonthsOfYear,
    pub run_on_last_week_of_month: bool,
    pub random_delay: String,
}

/// アイドル時（IIdleTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdleTrigger {
    pub base: TaskTrigger,
}

/// タスク登録/更新時（IRegistrationTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationTrigger {
    pub base: TaskTrigger,
    pub delay: String,
}

/// システム起動時（IBootTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootTrigger {
    pub base: TaskTrigger,
    pub delay: String,
}

/// ログオン時（ILogonTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogonTrigger {
    pub base: TaskTrigger,
    pub delay: String,
    /// 空なら全ユーザー
    pub user_id: String,
}

/// セッション状態変化（ISessionStateChangeTrigger）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionStateChangeTrigger {
    pub base: TaskTrigger,
    pub delay: String,
    pub state_change: SessionStateChange,
    pub user_id: String,
}

/// カスタムトリガー（読み取り専用。XML でのみ定義可能）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomTrigger {
    pub base: TaskTrigger,
}

/// トリガー（閉じた直和型）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Event(EventTrigger),
    Time(TimeTrigger),
    Daily(DailyTrigger),
    Weekly(WeeklyTrigger),
    Monthly(MonthlyTrigger),
    MonthlyDow(MonthlyDowTrigger),
    Idle(IdleTrigger),
    Registration(RegistrationTrigger),
    Boot(BootTrigger),
    Logon(LogonTrigger),
    SessionStateChange(SessionStateChangeTrigger),
    Custom(CustomTrigger),
}

// 全バリアントで同じ式を評価する
macro_rules! each_variant {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            Trigger::Event($t) => $body,
            Trigger::Time($t) => $body,
            Trigger::Daily($t) => $body,
            Trigger::Weekly($t) => $body,
            Trigger::Monthly($t) => $body,
            Trigger::MonthlyDow($t) => $body,
            Trigger::Idle($t) => $body,
            Trigger::Registration($t) => $body,
            Trigger::Boot($t) => $body,
            Trigger::Logon($t) => $body,
            Trigger::SessionStateChange($t) => $body,
            Trigger::Custom($t) => $body,
        }
    };
}

macro_rules! variant_type {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(
            impl $ty {
                pub const TYPE: TriggerType = TriggerType::$variant;
            }

            impl From<$ty> for Trigger {
                fn from(t: $ty) -> Self {
                    Self::$variant(t)
                }
            }
        )+
    };
}

variant_type! {
    EventTrigger => Event,
    TimeTrigger => Time,
    DailyTrigger => Daily,
    WeeklyTrigger => Weekly,
    MonthlyTrigger => Monthly,
    MonthlyDowTrigger => MonthlyDow,
    IdleTrigger => Idle,
    RegistrationTrigger => Registration,
    BootTrigger => Boot,
    LogonTrigger => Logon,
    SessionStateChangeTrigger => SessionStateChange,
    CustomTrigger => Custom,
}

impl Trigger {
    /// バリアントに対応するネイティブ種別
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::Event(_) => EventTrigger::TYPE,
            Self::Time(_) => TimeTrigger::TYPE,
            Self::Daily(_) => DailyTrigger::TYPE,
            Self::Weekly(_) => WeeklyTrigger::TYPE,
            Self::Monthly(_) => MonthlyTrigger::TYPE,
            Self::MonthlyDow(_) => MonthlyDowTrigger::TYPE,
            Self::Idle(_) => IdleTrigger::TYPE,
            Self::Registration(_) => RegistrationTrigger::TYPE,
            Self::Boot(_) => BootTrigger::TYPE,
            Self::Logon(_) => LogonTrigger::TYPE,
            Self::SessionStateChange(_) => SessionStateChangeTrigger::TYPE,
            Self::Custom(_) => CustomTrigger::TYPE,
        }
    }

    /// ネイティブの判別子（ITrigger::Type の値）
    pub fn type_code(&self) -> i32 {
        self.trigger_type().as_i32()
    }

    pub fn base(&self) -> &TaskTrigger {
        each_variant!(self, t => &t.base)
    }

    pub fn base_mut(&mut self) -> &mut TaskTrigger {
        each_variant!(self, t => &mut t.base)
    }

    pub fn is_enabled(&self) -> bool {
        self.base().enabled
    }

    /// 一覧表示用の要約
    pub fn summary(&self) -> String {
        let detail = match self {
            Self::Event(t) if t.value_queries.is_empty() => "on event".to_string(),
            Self::Event(t) => format!("on event ({} value queries)", t.value_queries.len()),
            Self::Time(t) => format!("at {}", t.base.start_boundary),
            Self::Daily(t) => format!("every {} day(s) from {}", t.days_interval, t.base.start_boundary),
            Self::Weekly(t) => format!(
                "every {} week(s) on {}",
                t.weeks_interval,
                t.days_of_week.names().join(",")
            ),
            Self::Monthly(t) => format!(
                "monthly on {:?}{} in {}",
                t.days_of_month.days(),
                if t.run_on_last_day_of_month { " +last" } else { "" },
                t.months_of_year.names().join(",")
            ),
            Self::MonthlyDow(t) => format!(
                "monthly {} week(s) {} in {}",
                t.weeks_of_month.names().join(","),
                t.days_of_week.names().join(","),
                t.months_of_year.names().join(",")
            ),
            Self::Idle(_) => "on idle".to_string(),
            Self::Registration(_) => "on registration".to_string(),
            Self::Boot(_) => "at boot".to_string(),
            Self::Logon(t) if t.user_id.is_empty() => "at logon of any user".to_string(),
            Self::Logon(t) => format!("at logon of {}", t.user_id),
            Self::SessionStateChange(t) => format!("on {}", t.state_change),
            Self::Custom(_) => "custom".to_string(),
        };
        let base = self.base();
        if !base.repetition.interval.is_empty() {
            format!("{detail}, repeat every {}", base.repetition.interval)
        } else {
            detail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_code_matches_native_constant() {
        let cases: Vec<(Trigger, i32)> = vec![
            (EventTrigger::default().into(), 0),
            (TimeTrigger::default().into(), 1),
            (DailyTrigger::default().into(), 2),
            (WeeklyTrigger::default().into(), 3),
            (MonthlyTrigger::default().into(), 4),
            (MonthlyDowTrigger::default().into(), 5),
            (IdleTrigger::default().into(), 6),
            (RegistrationTrigger::default().into(), 7),
            (BootTrigger::default().into(), 8),
            (LogonTrigger::default().into(), 9),
            (SessionStateChangeTrigger::default().into(), 11),
            (CustomTrigger::default().into(), 12),
        ];
        for (trigger, expected) in cases {
            assert_eq!(trigger.type_code(), expected, "{:?}", trigger.trigger_type());
        }
    }

    #[test]
    fn daily_trigger_reports_daily_regardless_of_fields() {
        let trigger = Trigger::from(DailyTrigger {
            base: TaskTrigger::starting_at("2024-01-01T03:00:00"),
            days_interval: 2,
            random_delay: "PT30M".into(),
        });
        assert_eq!(trigger.type_code(), 2);
        assert_eq!(trigger.trigger_type(), TriggerType::Daily);
        assert_eq!(trigger.base().start_boundary, "2024-01-01T03:00:00");
    }

    #[test]
    fn default_base_is_enabled() {
        let trigger = Trigger::from(BootTrigger::default());
        assert!(trigger.is_enabled());
    }

    #[test]
    fn base_mut_reaches_every_variant() {
        let mut triggers: Vec<Trigger> = vec![
            IdleTrigger::default().into(),
            LogonTrigger::default().into(),
            CustomTrigger::default().into(),
        ];
        for t in &mut triggers {
            t.base_mut().enabled = false;
            t.base_mut().repetition.interval = "PT5M".into();
        }
        assert!(triggers.iter().all(|t| !t.is_enabled()));
        assert!(triggers[1].summary().ends_with("repeat every PT5M"));
    }

    #[test]
    fn weekly_summary_lists_days() {
        let trigger = Trigger::from(WeeklyTrigger {
            days_of_week: DaysOfWeek::MONDAY | DaysOfWeek::WEDNESDAY,
            weeks_interval: 1,
            ..WeeklyTrigger::default()
        });
        assert_eq!(trigger.summary(), "every 1 week(s) on Mon,Wed");
    }

    #[test]
    fn repetition_without_interval_still_counts_as_set() {
        assert!(!RepetitionPattern::default().is_set());
        let pattern = RepetitionPattern {
            duration: "P1D".into(),
            stop_at_duration_end: true,
            ..RepetitionPattern::default()
        };
        assert!(pattern.is_set());
        let stop_only = RepetitionPattern {
            stop_at_duration_end: true,
            ..RepetitionPattern::default()
        };
        assert!(stop_only.is_set());
    }
}
