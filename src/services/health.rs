// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health report built from per-dependency checks.

use crate::db::Database;
use crate::services::attachments::Disk;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckHealth {
    pub healthy: bool,
    pub message: String,
}

/// One entry of the report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub display_name: &'static str,
    pub health: CheckHealth,
}

/// Aggregate health report. Healthy only if every check is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub healthy: bool,
    pub build_id: String,
    pub report: BTreeMap<&'static str, CheckReport>,
}

fn entry(display_name: &'static str, result: Result<String, String>) -> CheckReport {
    let (healthy, message) = match result {
        Ok(message) => (true, message),
        Err(message) => (false, message),
    };
    CheckReport {
        display_name,
        health: CheckHealth { healthy, message },
    }
}

/// Run every check and assemble the report.
pub async fn health_report(db: &Database, disk: &dyn Disk) -> HealthReport {
    let database = db
        .ping()
        .await
        .map(|()| "Database connection is healthy".to_string())
        .map_err(|e| e.to_string());
    let storage = disk.check().await;

    let mut report = BTreeMap::new();
    report.insert("database", entry("Database", database));
    report.insert("storage", entry("Attachment storage", storage));

    let healthy = report.values().all(|r| r.health.healthy);
    if !healthy {
        tracing::warn!(report = ?report, "Health check failed");
    }

    HealthReport {
        healthy,
        build_id: option_env!("BUILD_ID").unwrap_or("unknown").to_string(),
        report,
    }
}
