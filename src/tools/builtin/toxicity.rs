//! Early-stage nanoparticle toxicity screening from size, surface charge,
//! and core material. Research use only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{run_shared, CallOptions};
use crate::error::{HandlerError, ToolError};
use crate::tools::descriptor::{ParamKind, ParameterSpec, ToolDescriptor};
use crate::tools::handler::ToolHandler;
use crate::types::{Arguments, ToolRequest};

pub const TOOL_NAME: &str = "nanobio_toxicity_estimator";

const MAX_SCORE: f64 = 10.0;
const CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    fn from_score(score: f64) -> Self {
        if score < 3.0 {
            Self::Low
        } else if score < 6.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Typed arguments for [`TOOL_NAME`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicityInput {
    pub size_nm: f64,
    #[serde(rename = "charge_mV")]
    pub charge_mv: f64,
    pub material: String,
}

impl ToxicityInput {
    pub fn into_request(self) -> Result<ToolRequest, serde_json::Error> {
        ToolRequest::from_args(TOOL_NAME, &self)
    }

    /// Score through the shared client, validated like any other call.
    pub async fn run(self, options: CallOptions<'_>) -> Result<ToxicityVerdict, ToolError> {
        let request = ToolRequest::new(TOOL_NAME)
            .arg("size_nm", self.size_nm)
            .arg("charge_mV", self.charge_mv)
            .arg("material", self.material);
        let value = run_shared(&request, options).await?;
        serde_json::from_value(value).map_err(|e| ToolError::Execution {
            tool: TOOL_NAME.to_string(),
            source: HandlerError::Failed(format!("unexpected verdict shape: {e}")),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicityVerdict {
    pub toxicity_score: f64,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub confidence: f64,
    pub success: bool,
}

/// Score a particle. Pure and deterministic.
pub fn estimate(input: &ToxicityInput) -> ToxicityVerdict {
    let material = input.material.trim().to_lowercase();
    let mut score: f64 = 0.0;
    let mut reasons = Vec::new();

    if input.size_nm < 50.0 {
        score += 2.5;
        reasons.push("size < 50 nm".to_string());
    } else if input.size_nm > 200.0 {
        score += 3.0;
        reasons.push("size > 200 nm".to_string());
    }

    if input.charge_mv.abs() > 30.0 {
        score += 2.5;
        reasons.push("|charge| > 30 mV".to_string());
    }

    if matches!(material.as_str(), "gold" | "silver") {
        score += 2.0;
        reasons.push(format!("material = {material}"));
    }

    let score = score.clamp(0.0, MAX_SCORE);
    ToxicityVerdict {
        toxicity_score: (score * 100.0).round() / 100.0,
        risk_level: RiskLevel::from_score(score),
        reasons,
        confidence: CONFIDENCE,
        success: true,
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        TOOL_NAME,
        "Estimates early-stage nanoparticle toxicity risk using particle size (nm), \
         surface charge (mV), and material composition. Designed for nanomedicine \
         research and preclinical screening.",
    )
    .param(ParameterSpec::required("size_nm", ParamKind::Number).describe("Nanoparticle diameter in nm"))
    .param(
        ParameterSpec::required("charge_mV", ParamKind::Number)
            .describe("Surface zeta potential in mV"),
    )
    .param(
        ParameterSpec::required("material", ParamKind::String)
            .describe("Core material (e.g., lipid, polymer, gold)"),
    )
}

pub struct ToxicityEstimator;

#[async_trait]
impl ToolHandler for ToxicityEstimator {
    async fn call(&self, args: &Arguments) -> Result<Value, HandlerError> {
        let input: ToxicityInput = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        serde_json::to_value(estimate(&input)).map_err(|e| HandlerError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(size_nm: f64, charge_mv: f64, material: &str) -> ToxicityInput {
        ToxicityInput {
            size_nm,
            charge_mv,
            material: material.into(),
        }
    }

    #[test]
    fn small_polymer_is_low_risk() {
        let v = estimate(&input(30.0, 10.0, "polymer"));
        assert_eq!(v.reasons, vec!["size < 50 nm"]);
        assert_eq!(v.toxicity_score, 2.5);
        assert_eq!(v.risk_level, RiskLevel::Low);
        assert_eq!(v.confidence, 0.5);
    }

    #[test]
    fn mid_sized_neutral_lipid_scores_zero() {
        let v = estimate(&input(100.0, -5.0, "lipid"));
        assert!(v.reasons.is_empty());
        assert_eq!(v.toxicity_score, 0.0);
        assert_eq!(v.risk_level, RiskLevel::Low);
    }

    #[test]
    fn rules_accumulate() {
        let v = estimate(&input(250.0, -45.0, "  Gold "));
        assert_eq!(
            v.reasons,
            vec!["size > 200 nm", "|charge| > 30 mV", "material = gold"]
        );
        assert_eq!(v.toxicity_score, 7.5);
        assert_eq!(v.risk_level, RiskLevel::High);
    }

    #[test]
    fn risk_bands() {
        assert_eq!(estimate(&input(100.0, 31.0, "x")).risk_level, RiskLevel::Low);
        assert_eq!(estimate(&input(300.0, 0.0, "x")).risk_level, RiskLevel::Medium);
        assert_eq!(estimate(&input(10.0, 40.0, "x")).risk_level, RiskLevel::Medium);
        assert_eq!(estimate(&input(10.0, 40.0, "silver")).risk_level, RiskLevel::High);
    }

    #[test]
    fn boundaries_are_exclusive() {
        let v = estimate(&input(50.0, 30.0, "x"));
        assert!(v.reasons.is_empty());
        let v = estimate(&input(200.0, -30.0, "x"));
        assert!(v.reasons.is_empty());
    }

    #[tokio::test]
    async fn handler_serializes_verdict() {
        let req = input(30.0, 10.0, "polymer").into_request().unwrap();
        let out = ToxicityEstimator.call(&req.arguments).await.unwrap();
        assert_eq!(
            out,
            json!({
                "toxicity_score": 2.5,
                "risk_level": "Low",
                "reasons": ["size < 50 nm"],
                "confidence": 0.5,
                "success": true
            })
        );
    }

    #[tokio::test]
    async fn typed_run_goes_through_shared_client() {
        crate::client::shared_builtin_client();
        let verdict = input(30.0, 10.0, "polymer")
            .run(CallOptions::new().cached())
            .await
            .unwrap();
        assert_eq!(verdict.reasons, vec!["size < 50 nm"]);
        assert_eq!(verdict.risk_level, RiskLevel::Low);

        let err = input(f64::NAN, 10.0, "polymer")
            .run(CallOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.validation().unwrap().parameter, "size_nm");
    }

    #[test]
    fn typed_input_uses_wire_names() {
        let req = input(1.0, 2.0, "gold").into_request().unwrap();
        assert_eq!(req.name, TOOL_NAME);
        assert!(req.arguments.contains_key("charge_mV"));
    }
}
