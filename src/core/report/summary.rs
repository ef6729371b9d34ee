// src/core/report/summary.rs

use std::fmt::Write;

use strum::Display;

use crate::core::models::{FilteredEndpoint, FilteredReport};

/// Expiry used when no endpoint carries a certificate: "far in the future".
pub const NO_CERTIFICATE_EXPIRY_DAYS: f64 = 9999.0;

/// Certificates expiring within this many days get a "renew soon" clause.
pub const EXPIRY_WARNING_DAYS: f64 = 30.0;

pub const NO_INFORMATION_SUMMARY: &str = "No valid information could be obtained from the TLS analysis.";

/// Numeric priority of a letter grade, higher is better.
///
/// Unrecognized grades rank below `F`.
pub fn grade_priority(grade: &str) -> i32 {
    match grade {
        "A+" => 11,
        "A" => 10,
        "A-" => 9,
        "B+" => 8,
        "B" => 7,
        "B-" => 6,
        "C+" => 5,
        "C" => 4,
        "C-" => 3,
        "D+" => 2,
        "D" => 1,
        "D-" => 0,
        "E+" => -1,
        "E" => -2,
        "E-" => -3,
        "F" => -10,
        _ => -100,
    }
}

/// Final verdict tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Verdict {
    #[strum(serialize = "Excellent")]
    Excellent,
    #[strum(serialize = "Good")]
    Good,
    #[strum(serialize = "Acceptable (improvement recommended)")]
    Acceptable,
    #[strum(serialize = "Poor (high risk)")]
    Poor,
    #[strum(serialize = "Very poor (insecure site)")]
    VeryPoor,
}

/// Aggregated security posture across every endpoint of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Posture {
    pub best_grade: String,
    pub has_warnings: bool,
    pub is_exceptional: bool,
    pub has_weak_ciphers: bool,
    pub has_hsts: bool,
    pub has_tls13: bool,
    pub min_expires_in_days: f64,
    pub max_chain_issues: i64,
}

impl Posture {
    /// Folds the endpoints in a single pass. Returns `None` when there are none.
    pub fn from_endpoints(endpoints: &[FilteredEndpoint]) -> Option<Self> {
        if endpoints.is_empty() {
            return None;
        }

        let mut posture = Posture {
            best_grade: "F".to_string(),
            has_warnings: false,
            is_exceptional: false,
            has_weak_ciphers: false,
            has_hsts: false,
            has_tls13: false,
            min_expires_in_days: NO_CERTIFICATE_EXPIRY_DAYS,
            max_chain_issues: 0,
        };

        for ep in endpoints {
            if grade_priority(&ep.grade) > grade_priority(&posture.best_grade) {
                posture.best_grade = ep.grade.clone();
            }
            posture.has_warnings |= ep.has_warnings;
            posture.is_exceptional |= ep.is_exceptional;
            posture.has_weak_ciphers |= ep.has_weak_ciphers;
            posture.has_hsts |= ep.hsts.to_lowercase().contains("present");
            posture.has_tls13 |= ep.protocols.iter().any(|p| p == "TLS 1.3");
            posture.max_chain_issues = posture.max_chain_issues.max(ep.chain_issues);
            if let Some(cert) = &ep.certificate {
                posture.min_expires_in_days = posture.min_expires_in_days.min(cert.expires_in_days);
            }
        }

        Some(posture)
    }

    pub fn verdict(&self) -> Verdict {
        let grade = self.best_grade.as_str();
        // Tiers follow grade families so that a better grade never yields a worse verdict.
        match grade {
            "A+" => Verdict::Excellent,
            "A" if self.is_exceptional && !self.has_warnings && self.has_tls13 && self.has_hsts => {
                Verdict::Excellent
            }
            "A" => Verdict::Good,
            "A-" if self.has_tls13 && self.has_hsts => Verdict::Good,
            "A-" | "B+" | "B" | "B-" | "C+" | "C" | "C-" => Verdict::Acceptable,
            "D+" | "D" | "D-" | "E+" | "E" | "E-" => Verdict::Poor,
            _ => Verdict::VeryPoor,
        }
    }
}

/// Builds the narrative summary and final verdict of a reduced report.
pub fn summarize(report: &FilteredReport) -> String {
    let Some(posture) = Posture::from_endpoints(&report.endpoints) else {
        return NO_INFORMATION_SUMMARY.to_string();
    };
    // Protocol fallback and cipher clause are judged on the first endpoint.
    let reference = &report.endpoints[0];
    let mut sb = String::new();

    // Writing into a String cannot fail.
    let _ = write!(sb, "TLS analysis for {} - Overall grade: {}.", report.host, posture.best_grade);

    if posture.has_tls13 {
        sb.push_str(" Supports TLS 1.3 (excellent current security level).");
    } else if reference.protocols.iter().any(|p| p == "TLS 1.2") {
        sb.push_str(" Supports TLS 1.2 but not TLS 1.3 (acceptable, not optimal).");
    } else {
        sb.push_str(" Obsolete or insecure protocols detected.");
    }

    if reference.max_cipher_strength >= 256.0 {
        sb.push_str(" Strong encryption (up to 256 bits).");
    } else if reference.max_cipher_strength >= 128.0 {
        sb.push_str(" Acceptable encryption (128 bits).");
    } else {
        sb.push_str(" Weak encryption detected.");
    }
    if posture.has_weak_ciphers {
        sb.push_str(" Warning: weak cipher suites are enabled.");
    }

    if posture.has_hsts {
        sb.push_str(" HSTS is active (good protection against downgrade).");
    } else {
        sb.push_str(" No HSTS, vulnerable to downgrade attacks (plain HTTP possible).");
    }

    if posture.min_expires_in_days > EXPIRY_WARNING_DAYS {
        sb.push_str(" Certificate valid for more than 30 days.");
    } else if posture.min_expires_in_days > 0.0 {
        let _ = write!(sb, " Certificate expires in {:.1} days, renew soon.", posture.min_expires_in_days);
    } else {
        sb.push_str(" Certificate expired or invalid, the site is insecure.");
    }

    if posture.has_warnings {
        sb.push_str(" Minor configuration warnings exist.");
    }
    if posture.is_exceptional {
        sb.push_str(" At least one endpoint has an exceptional configuration.");
    }
    if posture.max_chain_issues > 0 {
        sb.push_str(" Problems detected in the certificate chain.");
    }

    let _ = write!(sb, " FINAL VERDICT: {}", posture.verdict());
    sb
}
