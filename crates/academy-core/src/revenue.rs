//! Dashboard counters and per-course revenue, computed over registrations.
//!
//! Revenue only counts `completed` registrations. Amounts stay in paise.

use crate::catalog::CourseCatalog;
use crate::registration::{Registration, RegistrationStatus};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_registrations: u64,
    pub total_revenue: i64,
    pub pending: u64,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRevenue {
    pub course: String,
    pub course_name: String,
    pub registrations: u64,
    pub total_revenue: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub courses: Vec<CourseRevenue>,
    pub total_revenue: i64,
}

pub fn dashboard(registrations: &[Registration]) -> DashboardStats {
    registrations
        .iter()
        .fold(DashboardStats::default(), |mut stats, r| {
            stats.total_registrations += 1;
            match r.status {
                RegistrationStatus::Pending => stats.pending += 1,
                RegistrationStatus::Completed => {
                    stats.completed += 1;
                    stats.total_revenue = stats.total_revenue.saturating_add(r.amount);
                }
                RegistrationStatus::Failed => stats.failed += 1,
            }
            stats
        })
}

/// Completed revenue grouped by course, highest first
pub fn revenue_by_course(registrations: &[Registration], catalog: &CourseCatalog) -> RevenueReport {
    let mut by_course: HashMap<&str, (u64, i64)> = HashMap::new();
    for r in registrations.iter().filter(|r| r.status == RegistrationStatus::Completed) {
        let entry = by_course.entry(r.course.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(r.amount);
    }

    let mut courses: Vec<CourseRevenue> = by_course
        .into_iter()
        .map(|(course, (count, revenue))| CourseRevenue {
            course: course.to_string(),
            course_name: catalog
                .get(course)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| course.to_string()),
            registrations: count,
            total_revenue: revenue,
        })
        .collect();
    courses.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then_with(|| a.course.cmp(&b.course))
    });

    let total_revenue = courses
        .iter()
        .fold(0i64, |total, c| total.saturating_add(c.total_revenue));
    RevenueReport {
        courses,
        total_revenue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(course: &str, amount: i64, status: RegistrationStatus) -> Registration {
        let mut r = Registration::new("A", "a@x.com", "1", course, amount);
        r.status = status;
        r
    }

    fn sample() -> Vec<Registration> {
        vec![
            registration("live-workshops", 29900, RegistrationStatus::Completed),
            registration("live-workshops", 29900, RegistrationStatus::Completed),
            registration("premium-combo", 2_500_000, RegistrationStatus::Completed),
            registration("premium-combo", 2_500_000, RegistrationStatus::Pending),
            registration("digital-growth", 499_900, RegistrationStatus::Failed),
        ]
    }

    #[test]
    fn test_dashboard_counts_and_completed_revenue() {
        let stats = dashboard(&sample());

        assert_eq!(stats.total_registrations, 5);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_revenue, 2_559_800);
    }

    #[test]
    fn test_revenue_by_course_sorted_desc() {
        let report = revenue_by_course(&sample(), &CourseCatalog::builtin());

        assert_eq!(report.courses.len(), 2);
        assert_eq!(report.courses[0].course, "premium-combo");
        assert_eq!(report.courses[0].registrations, 1);
        assert_eq!(report.courses[1].course_name, "Sunday Live Workshops");
        assert_eq!(report.courses[1].total_revenue, 59800);
        assert_eq!(report.total_revenue, 2_559_800);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let records = vec![
            registration("live-workshops", i64::MAX, RegistrationStatus::Completed),
            registration("live-workshops", 1, RegistrationStatus::Completed),
            registration("premium-combo", i64::MAX, RegistrationStatus::Completed),
        ];

        assert_eq!(dashboard(&records).total_revenue, i64::MAX);
        let report = revenue_by_course(&records, &CourseCatalog::builtin());
        assert_eq!(report.courses[0].total_revenue, i64::MAX);
        assert_eq!(report.total_revenue, i64::MAX);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(dashboard(&[]), DashboardStats::default());
        assert!(revenue_by_course(&[], &CourseCatalog::builtin()).courses.is_empty());
    }
}
