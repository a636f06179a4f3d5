//! カレンダー系トリガーのビットマスク（曜日・週・月・日）
//!
//! ネイティブと同じ整数をそのまま保持する。

use std::ops::BitOr;

macro_rules! calendar_mask {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) {
            $( $flag:ident = $value:expr => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            $( pub const $flag: Self = Self($value); )+

            const NAMED: &'static [(&'static str, Self)] = &[ $( ($label, Self::$flag), )+ ];

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// 立っているビットの名前一覧
            pub fn names(self) -> Vec<&'static str> {
                Self::NAMED
                    .iter()
                    .filter(|(_, flag)| self.contains(*flag))
                    .map(|(name, _)| *name)
                    .collect()
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
    };
}

calendar_mask! {
    /// 曜日（IWeeklyTrigger::DaysOfWeek など）
    pub struct DaysOfWeek(i16) {
        SUNDAY = 0x01 => "Sun",
        MONDAY = 0x02 => "Mon",
        TUESDAY = 0x04 => "Tue",
        WEDNESDAY = 0x08 => "Wed",
        THURSDAY = 0x10 => "Thu",
        FRIDAY = 0x20 => "Fri",
        SATURDAY = 0x40 => "Sat",
    }
}

calendar_mask! {
    /// 第n週（IMonthlyDOWTrigger::WeeksOfMonth）
    pub struct WeeksOfMonth(i16) {
        FIRST = 0x01 => "1st",
        SECOND = 0x02 => "2nd",
        THIRD = 0x04 => "3rd",
        FOURTH = 0x08 => "4th",
    }
}

calendar_mask! {
    /// 月（MonthsOfYear）
    pub struct MonthsOfYear(i16) {
        JANUARY = 0x001 => "Jan",
        FEBRUARY = 0x002 => "Feb",
        MARCH = 0x004 => "Mar",
        APRIL = 0x008 => "Apr",
        MAY = 0x010 => "May",
        JUNE = 0x020 => "Jun",
        JULY = 0x040 => "Jul",
        AUGUST = 0x080 => "Aug",
        SEPTEMBER = 0x100 => "Sep",
        OCTOBER = 0x200 => "Oct",
        NOVEMBER = 0x400 => "Nov",
        DECEMBER = 0x800 => "Dec",
    }
}

calendar_mask! {
    /// 日（IMonthlyTrigger::DaysOfMonth）。bit n-1 が n 日。
    pub struct DaysOfMonth(i32) {
        LAST = i32::MIN => "Last",
    }
}

impl MonthsOfYear {
    pub const ALL: Self = Self(0x0fff);
}

impl DaysOfMonth {
    /// n 日（1..=31）のビット。範囲外は None。
    pub fn day(n: u8) -> Option<Self> {
        if (1..=31).contains(&n) {
            Some(Self(1 << (n - 1)))
        } else {
            None
        }
    }

    /// 立っている日付（1..=31）の一覧。LAST は含めない。
    pub fn days(self) -> Vec<u8> {
        (1..=31u8)
            .filter(|n| self.0 & (1 << (n - 1)) != 0)
            .collect()
    }
}
