//! Read-dispatch policy: given the confirmed device configuration, decide
//! whether a read polls the device or waits for an autonomous push, and how
//! long the wait may last.

use std::time::Duration;

use crate::config::{DeviceConfig, ReportingMode};

/// How a single read should be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadPlan {
    /// The driver is the initiator: send a query command and wait the
    /// session's default timeout for the reply.
    Query { timeout: Duration },
    /// The device is the initiator: send nothing and wait for a pushed
    /// measurement. The window covers a full work period plus slack.
    AwaitPush { timeout: Duration },
}

pub(crate) fn plan_read(config: &DeviceConfig, default_timeout: Duration) -> ReadPlan {
    match config.reporting_mode {
        ReportingMode::Query => ReadPlan::Query {
            timeout: default_timeout,
        },
        ReportingMode::Active => ReadPlan::AwaitPush {
            timeout: Duration::from_secs(u64::from(config.work_period) * 60 + 1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_mode_polls_with_the_default_timeout() {
        let config = DeviceConfig {
            reporting_mode: ReportingMode::Query,
            work_period: 5,
        };
        assert_eq!(
            plan_read(&config, Duration::from_secs(2)),
            ReadPlan::Query {
                timeout: Duration::from_secs(2)
            }
        );
    }

    #[test]
    fn active_mode_waits_a_full_period_plus_slack() {
        let config = DeviceConfig {
            reporting_mode: ReportingMode::Active,
            work_period: 1,
        };
        assert_eq!(
            plan_read(&config, Duration::from_secs(2)),
            ReadPlan::AwaitPush {
                timeout: Duration::from_secs(61)
            }
        );
    }

    #[test]
    fn continuous_active_mode_still_has_slack() {
        let config = DeviceConfig {
            reporting_mode: ReportingMode::Active,
            work_period: 0,
        };
        assert_eq!(
            plan_read(&config, Duration::from_secs(2)),
            ReadPlan::AwaitPush {
                timeout: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn longest_period_is_covered() {
        let config = DeviceConfig {
            reporting_mode: ReportingMode::Active,
            work_period: 30,
        };
        assert_eq!(
            plan_read(&config, Duration::from_secs(2)),
            ReadPlan::AwaitPush {
                timeout: Duration::from_secs(1801)
            }
        );
    }
}
