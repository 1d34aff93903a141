//! Clinical interpretation of a CKD prediction.
//!
//! Everything here is pure: risk tiers from the model probability, KDIGO-style
//! staging from GFR, and threshold rules that turn individual measurements
//! into key factors and follow-up recommendations.

use crate::compute::inference::{value_or_zero, RequestPayload};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier derived from the predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }

    /// Baseline advice for this tier.
    pub fn baseline_recommendations(&self) -> [&'static str; 4] {
        match self {
            RiskLevel::VeryHigh => [
                "Immediate consultation with a nephrologist is strongly recommended",
                "Consider preparation for renal replacement therapy (dialysis or transplant)",
                "Strict monitoring of fluid intake and electrolyte balance",
                "Regular cardiovascular assessment due to increased heart disease risk",
            ],
            RiskLevel::High => [
                "Schedule appointment with a nephrologist within 2-4 weeks",
                "Implement strict blood pressure and diabetes management",
                "Consider dietary protein restriction under medical supervision",
                "Monitor kidney function every 3-6 months",
            ],
            RiskLevel::Moderate => [
                "Regular follow-up with primary care physician",
                "Annual nephrology consultation recommended",
                "Focus on blood pressure and blood sugar control",
                "Maintain healthy lifestyle with regular exercise",
            ],
            RiskLevel::Low => [
                "Continue current healthy lifestyle practices",
                "Annual kidney function screening",
                "Maintain optimal blood pressure and blood sugar levels",
                "Stay hydrated and avoid nephrotoxic medications",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CKD stage derived from GFR, ordered from normal to kidney failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CkdStage {
    #[serde(rename = "Normal/Stage 1")]
    Stage1,
    #[serde(rename = "Stage 2 (Mild)")]
    Stage2,
    #[serde(rename = "Stage 3a (Moderate)")]
    Stage3a,
    #[serde(rename = "Stage 3b (Moderate)")]
    Stage3b,
    #[serde(rename = "Stage 4 (Severe)")]
    Stage4,
    #[serde(rename = "Stage 5 (Kidney Failure)")]
    Stage5,
}

impl CkdStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CkdStage::Stage1 => "Normal/Stage 1",
            CkdStage::Stage2 => "Stage 2 (Mild)",
            CkdStage::Stage3a => "Stage 3a (Moderate)",
            CkdStage::Stage3b => "Stage 3b (Moderate)",
            CkdStage::Stage4 => "Stage 4 (Severe)",
            CkdStage::Stage5 => "Stage 5 (Kidney Failure)",
        }
    }
}

impl fmt::Display for CkdStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a positive-class probability to a risk tier; lower bounds are inclusive.
pub fn risk_level(probability: f64) -> RiskLevel {
    if probability >= 0.8 {
        RiskLevel::VeryHigh
    } else if probability >= 0.6 {
        RiskLevel::High
    } else if probability >= 0.4 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Stage kidney function from GFR (mL/min/1.73m²); lower bounds are inclusive.
pub fn ckd_stage(gfr: f64) -> CkdStage {
    if gfr >= 90.0 {
        CkdStage::Stage1
    } else if gfr >= 60.0 {
        CkdStage::Stage2
    } else if gfr >= 45.0 {
        CkdStage::Stage3a
    } else if gfr >= 30.0 {
        CkdStage::Stage3b
    } else if gfr >= 15.0 {
        CkdStage::Stage4
    } else {
        CkdStage::Stage5
    }
}

/// Render a measurement as the shortest round-trip float: `40.0`, `0.4`.
///
/// Values with a decimal exponent below -4 or from 16 up switch to
/// exponent form with a signed, two-digit exponent: `1e-05`, `-1e+20`.
fn fmt_measure(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", v);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Abnormal measurements worth calling out. Absent fields read as 0.
pub fn key_factors(payload: &RequestPayload) -> Result<Vec<String>> {
    let mut factors = Vec::new();

    let gfr = value_or_zero(&payload.gfr, "GFR")?;
    if gfr < 60.0 {
        factors.push(format!(
            "Reduced GFR ({} mL/min/1.73m²) indicating decreased kidney function",
            fmt_measure(gfr)
        ));
    }

    let creatinine = value_or_zero(&payload.serum_creatinine, "SerumCreatinine")?;
    if creatinine > 1.3 {
        factors.push(format!(
            "Elevated serum creatinine ({} mg/dL)",
            fmt_measure(creatinine)
        ));
    }

    let protein = value_or_zero(&payload.protein_in_urine, "ProteinInUrine")?;
    if protein > 0.15 {
        factors.push(format!("Proteinuria detected ({} g/day)", fmt_measure(protein)));
    }

    let bun = value_or_zero(&payload.bun_levels, "BUNLevels")?;
    if bun > 20.0 {
        factors.push(format!(
            "Elevated blood urea nitrogen ({} mg/dL)",
            fmt_measure(bun)
        ));
    }

    let fbs = value_or_zero(&payload.fasting_blood_sugar, "FastingBloodSugar")?;
    if fbs > 125.0 {
        factors.push(format!(
            "Diabetes ({} mg/dL) contributing to kidney damage",
            fmt_measure(fbs)
        ));
    }

    let itching = value_or_zero(&payload.itching, "Itching")?;
    if itching > 5.0 {
        factors.push("Significant uremic symptoms (severe itching)".to_string());
    }

    Ok(factors)
}

/// Tier advice followed by measurement-specific advice.
pub fn recommendations(level: RiskLevel, payload: &RequestPayload) -> Result<Vec<String>> {
    let mut recs: Vec<String> = level
        .baseline_recommendations()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if value_or_zero(&payload.systolic_bp, "systolicBP")? > 140.0 {
        recs.push(
            "Blood pressure management is critical - consider ACE inhibitors or ARBs".to_string(),
        );
    }

    if value_or_zero(&payload.fasting_blood_sugar, "FastingBloodSugar")? > 125.0 {
        recs.push("Diabetes management is essential - maintain HbA1c < 7%".to_string());
    }

    if value_or_zero(&payload.protein_in_urine, "ProteinInUrine")? > 0.3 {
        recs.push("Proteinuria management with ACE inhibitors or ARBs recommended".to_string());
    }

    if value_or_zero(&payload.bun_levels, "BUNLevels")? > 25.0 {
        recs.push("Monitor for uremic symptoms and consider dietary modifications".to_string());
    }

    Ok(recs)
}
