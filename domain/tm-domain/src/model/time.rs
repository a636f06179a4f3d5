//! ネイティブの DATE 型（OLE オートメーション日時）
//!
//! 1899-12-30 00:00 からの日数（小数部が時刻）。タイムゾーンはローカル時刻のまま。

use std::fmt;

/// 1899-12-30 から 1970-01-01 までの日数
const OLE_TO_UNIX_DAYS: i64 = 25_569;

/// DATE の有効範囲（0100-01-01 〜 9999-12-31 23:59:59）
pub const OLE_DATE_MIN: f64 = -657_434.0;
pub const OLE_DATE_MAX: f64 = 2_958_465.999_99;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct OleDate(pub f64);

impl OleDate {
    /// 0.0 は「未実行/予定なし」を意味するため None にする。範囲外も None。
    pub fn from_native(value: f64) -> Option<Self> {
        if value == 0.0 || !(OLE_DATE_MIN..=OLE_DATE_MAX).contains(&value) {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// (年, 月, 日, 時, 分, 秒)。秒未満は四捨五入、範囲外は端に寄せる。
    pub fn to_components(self) -> (i32, u32, u32, u32, u32, u32) {
        let value = if self.0.is_nan() {
            0.0
        } else {
            self.0.clamp(OLE_DATE_MIN, OLE_DATE_MAX)
        };
        let total_secs = (value * 86_400.0).round() as i64 - OLE_TO_UNIX_DAYS * 86_400;
        let days = total_secs.div_euclid(86_400);
        let rem = total_secs.rem_euclid(86_400);
        let hour = (rem / 3_600) as u32;
        let minute = ((rem % 3_600) / 60) as u32;
        let second = (rem % 60) as u32;
        let (year, month, day) = civil_from_days(days);
        (year, month, day, hour, minute, second)
    }
}

impl fmt::Display for OleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day, hour, minute, second) = self.to_components();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )
    }
}

/// 1970-01-01 からの日数 → (年, 月, 日)
pub fn civil_from_days(days: i64) -> (i32, u32, u32) {
    // Howard Hinnant のアルゴリズム
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]
    let year = y + if m <= 2 { 1 } else { 0 };
    (year as i32, m as u32, d as u32)
}
