//! Request letter generation.
//!
//! The text-generation backend is an opaque collaborator: given a query and
//! a department it returns formatted text and an optional structured
//! breakdown. The bundled implementation is a deterministic formatter; the
//! subject default is applied here, at generation time, never at storage
//! time.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::ApplicantDetails;

/// Options accompanying a generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub subject: Option<String>,
    pub applicant: ApplicantDetails,
    pub language: String,
}

/// Structured breakdown of a generated letter.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterBreakdown {
    pub subject: String,
    pub salutation: String,
    pub body: String,
    pub closing: String,
}

/// Result of a generation call.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedText {
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<LetterBreakdown>,
}

/// Seam to the text-generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        query: &str,
        department: &str,
        options: &GenerateOptions,
    ) -> Result<GeneratedText, AppError>;
}

/// Deterministic formatter producing a standard request letter.
pub struct LetterFormatter;

impl LetterFormatter {
    fn default_subject(query: &str) -> String {
        let mut words: Vec<&str> = query.split_whitespace().take(8).collect();
        let truncated = words.len() == 8 && query.split_whitespace().count() > 8;
        if truncated {
            words.push("...");
        }
        format!("Request for information: {}", words.join(" "))
    }
}

#[async_trait]
impl Generator for LetterFormatter {
    async fn generate(
        &self,
        query: &str,
        department: &str,
        options: &GenerateOptions,
    ) -> Result<GeneratedText, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Query is required".to_string()));
        }
        if department.trim().is_empty() {
            return Err(AppError::Validation("Department is required".to_string()));
        }
        if options.language != "en" {
            tracing::debug!(
                "No letter scaffolding for language {:?}, falling back to English",
                options.language
            );
        }

        let subject = options
            .subject
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::default_subject(query));

        let salutation = format!("To,\nThe Public Information Officer,\n{}", department);

        let body = format!(
            "Subject: {}\n\nUnder the Right to Information Act, I request the following \
             information:\n\n{}\n\nPlease provide the information within the statutory \
             time limit.",
            subject,
            query.trim()
        );

        let signature = if options.applicant.name.trim().is_empty() {
            "Applicant".to_string()
        } else {
            options.applicant.name.clone()
        };
        let closing = format!("Yours faithfully,\n{}", signature);

        let formatted = format!("{}\n\n{}\n\n{}", salutation, body, closing);

        Ok(GeneratedText {
            formatted,
            structured: Some(LetterBreakdown {
                subject,
                salutation,
                body,
                closing,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subject_default_applied_at_generation() {
        let gen = LetterFormatter;
        let result = gen
            .generate(
                "copies of all pending requests for proposal issued during 2023",
                "Ministry of Finance",
                &GenerateOptions {
                    subject: None,
                    applicant: ApplicantDetails::default(),
                    language: "en".to_string(),
                },
            )
            .await
            .unwrap();

        let structured = result.structured.unwrap();
        assert!(structured.subject.starts_with("Request for information:"));
        assert!(structured.subject.ends_with("..."));
        assert!(result.formatted.contains("Ministry of Finance"));
    }

    #[tokio::test]
    async fn test_explicit_subject_is_kept() {
        let gen = LetterFormatter;
        let result = gen
            .generate(
                "pending RFPs 2023",
                "Ministry of Finance",
                &GenerateOptions {
                    subject: Some("RFP status".to_string()),
                    applicant: ApplicantDetails::default(),
                    language: "en".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.structured.unwrap().subject, "RFP status");
    }

    #[tokio::test]
    async fn test_generation_requires_query_and_department() {
        let gen = LetterFormatter;
        let options = GenerateOptions::default();

        let err = gen.generate("", "Ministry of Finance", &options).await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        let err = gen.generate("pending RFPs 2023", "  ", &options).await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
