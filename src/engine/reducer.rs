// ==========================================
// 店铺排班系统 - 班段还原
// ==========================================
// 职责: 将求解矩阵还原为每人一个 [首小时, 末小时 + 1) 的班段
// 红线: 不连续的排班必须被检测出来，不得静默合并
// ==========================================

use crate::domain::shift::{ShiftBlock, ShiftGap};
use crate::domain::types::{GapPolicy, Hour};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::model::AssignmentMatrix;
use chrono::NaiveDate;
use tracing::warn;

/// 还原结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReducedSchedule {
    pub blocks: Vec<ShiftBlock>,
    pub gaps: Vec<ShiftGap>,
}

impl ReducedSchedule {
    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }
}

pub struct BlockReducer {
    gap_policy: GapPolicy,
}

impl BlockReducer {
    pub fn new(gap_policy: GapPolicy) -> Self {
        Self { gap_policy }
    }

    /// 还原班段
    ///
    /// 输出顺序与输入员工顺序一致；没有排班小时的员工不产生班段
    pub fn reduce(&self, plan_date: NaiveDate, matrix: &AssignmentMatrix) -> EngineResult<ReducedSchedule> {
        let variables = matrix.variables();
        let mut reduced = ReducedSchedule::default();

        for (worker_index, worker_id) in variables.worker_ids().iter().enumerate() {
            let hours = matrix.assigned_hours(worker_index);
            let (first, last) = match (hours.first(), hours.last()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => continue,
            };

            let gap_hours: Vec<Hour> = (first..=last).filter(|h| !hours.contains(h)).collect();
            if !gap_hours.is_empty() {
                match self.gap_policy {
                    GapPolicy::Reject => {
                        return Err(EngineError::NonContiguousAssignment {
                            worker_id: *worker_id,
                            gap_hours,
                        });
                    }
                    GapPolicy::Flag => {
                        warn!(
                            plan_date = %plan_date,
                            worker_id = *worker_id,
                            gap_hours = ?gap_hours,
                            "排班小时不连续，已合并为一个班段并标记断档"
                        );
                        reduced.gaps.extend(gap_hours.iter().map(|hour| ShiftGap {
                            worker_id: *worker_id,
                            hour: *hour,
                        }));
                    }
                }
            }

            reduced
                .blocks
                .push(ShiftBlock::new(*worker_id, plan_date, first, last + 1));
        }

        Ok(reduced)
    }
}

impl Default for BlockReducer {
    fn default() -> Self {
        Self::new(GapPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OperatingHours;
    use crate::domain::worker::Worker;
    use crate::engine::model::VariableModel;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 25).unwrap()
    }

    /// hours[i] = 第 i 名员工的排班小时
    fn matrix(hours: &[&[Hour]]) -> AssignmentMatrix {
        let workers: Vec<Worker> = (0..hours.len())
            .map(|i| Worker::new(i as i64 + 1, format!("W{}", i + 1)))
            .collect();
        let vars = VariableModel::build(&workers, OperatingHours::default()).unwrap();
        let mut values = vec![false; vars.var_count()];
        for (w, assigned) in hours.iter().enumerate() {
            for h in assigned.iter() {
                values[vars.var(w, *h).unwrap().index()] = true;
            }
        }
        AssignmentMatrix::new(vars, values)
    }

    #[test]
    fn test_contiguous_hours_become_half_open_blocks() {
        let m = matrix(&[&[9, 10, 11, 12, 13, 14, 15, 16], &[], &[22]]);
        let reduced = BlockReducer::default().reduce(date(), &m).unwrap();

        assert_eq!(
            reduced.blocks,
            vec![
                ShiftBlock::new(1, date(), 9, 17),
                ShiftBlock::new(3, date(), 22, 23),
            ]
        );
        assert!(!reduced.has_gaps());
    }

    #[test]
    fn test_gap_is_flagged_by_default() {
        let m = matrix(&[&[9, 10, 14, 15]]);
        let reduced = BlockReducer::new(GapPolicy::Flag).reduce(date(), &m).unwrap();

        assert_eq!(reduced.blocks, vec![ShiftBlock::new(1, date(), 9, 16)]);
        let gap_hours: Vec<Hour> = reduced.gaps.iter().map(|g| g.hour).collect();
        assert_eq!(gap_hours, vec![11, 12, 13]);
    }

    #[test]
    fn test_gap_is_rejected_under_reject_policy() {
        let m = matrix(&[&[9, 10, 11], &[12, 14]]);
        let err = BlockReducer::new(GapPolicy::Reject).reduce(date(), &m).unwrap_err();

        assert_eq!(
            err,
            EngineError::NonContiguousAssignment {
                worker_id: 2,
                gap_hours: vec![13],
            }
        );
    }
}
