// ==========================================
// 店铺排班系统 - 需求人数领域模型
// ==========================================
// 对齐: demand_override 表 (按日期覆写)
// 红线: 每个营业小时都有最低人数（未指定时取默认值）
// ==========================================

use crate::domain::types::Hour;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 默认每小时最低人数
pub const DEFAULT_MIN_STAFF: u32 = 1;

/// 默认高峰时段最低人数
pub const DEFAULT_PEAK_MIN_STAFF: u32 = 2;

/// 默认高峰时段（午餐 12:00-14:00）
pub const DEFAULT_PEAK_HOURS: [Hour; 2] = [12, 13];

// ==========================================
// DemandProfile - 每小时需求人数
// ==========================================
// 解析顺序: 按日期覆写 > 高峰时段 > 默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub default_min: u32,               // 非高峰时段最低人数
    pub peak_hours: BTreeSet<Hour>,     // 高峰小时
    pub peak_min: u32,                  // 高峰时段最低人数
    pub overrides: BTreeMap<Hour, u32>, // 外部覆写 (hour -> min)
}

impl DemandProfile {
    /// 标准需求：全天 1 人，午餐高峰 2 人
    pub fn standard() -> Self {
        Self {
            default_min: DEFAULT_MIN_STAFF,
            peak_hours: DEFAULT_PEAK_HOURS.iter().copied().collect(),
            peak_min: DEFAULT_PEAK_MIN_STAFF,
            overrides: BTreeMap::new(),
        }
    }

    /// 所有小时统一需求人数（无高峰）
    pub fn uniform(min: u32) -> Self {
        Self {
            default_min: min,
            peak_hours: BTreeSet::new(),
            peak_min: min,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_peak(mut self, hours: impl IntoIterator<Item = Hour>, min: u32) -> Self {
        self.peak_hours = hours.into_iter().collect();
        self.peak_min = min;
        self
    }

    pub fn with_override(mut self, hour: Hour, min: u32) -> Self {
        self.overrides.insert(hour, min);
        self
    }

    /// 指定小时的最低人数
    pub fn required(&self, hour: Hour) -> u32 {
        if let Some(min) = self.overrides.get(&hour) {
            return *min;
        }
        if self.peak_hours.contains(&hour) {
            self.peak_min
        } else {
            self.default_min
        }
    }

    /// 被覆写的小时（用于输入校验）
    pub fn override_hours(&self) -> impl Iterator<Item = Hour> + '_ {
        self.overrides.keys().copied()
    }
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_profile_lunch_peak() {
        let profile = DemandProfile::standard();
        assert_eq!(profile.required(9), 1);
        assert_eq!(profile.required(12), 2);
        assert_eq!(profile.required(13), 2);
        assert_eq!(profile.required(14), 1);
        assert_eq!(profile.required(22), 1);
    }

    #[test]
    fn test_override_wins_over_peak_and_default() {
        let profile = DemandProfile::standard()
            .with_override(12, 3)
            .with_override(20, 0);
        assert_eq!(profile.required(12), 3);
        assert_eq!(profile.required(20), 0);
        assert_eq!(profile.required(13), 2);
    }

    #[test]
    fn test_uniform_profile() {
        let profile = DemandProfile::uniform(1);
        assert!((9..23).all(|h| profile.required(h) == 1));
    }
}
