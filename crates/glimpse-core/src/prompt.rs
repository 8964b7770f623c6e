//! Canned prompt templates keyed by recognition type.

use crate::types::RecognitionType;

/// Template sent for a recognition type.
pub fn template(recognition_type: RecognitionType) -> &'static str {
    match recognition_type {
        RecognitionType::Auto => {
            "Identify what kind of content this image contains and extract all of it. \
             Reproduce any visible text exactly, keep the original layout where it \
             matters, and briefly describe non-text elements."
        }
        RecognitionType::Text => {
            "Extract all text from this image exactly as written. Preserve line breaks \
             and paragraph order. Do not add commentary."
        }
        RecognitionType::Handwriting => {
            "Transcribe the handwritten text in this image. Preserve line breaks. \
             Mark words you cannot read as [illegible]."
        }
        RecognitionType::Receipt => {
            "Extract the contents of this receipt: merchant name, date and time, each \
             line item with quantity and price, subtotal, tax, total and payment method."
        }
        RecognitionType::Invoice => {
            "Extract the contents of this invoice: invoice number, issue and due dates, \
             seller and buyer details, line items with amounts, taxes and the total due."
        }
        RecognitionType::Document => {
            "Extract the text of this document. Keep headings, lists and paragraph \
             structure, and output it as Markdown."
        }
        RecognitionType::Table => {
            "Extract every table in this image as a Markdown table. Keep the header row, \
             column order and empty cells."
        }
        RecognitionType::IdCard => {
            "Extract the fields printed on this identity document (name, number, date of \
             birth, issue and expiry dates, issuing authority) as key: value lines."
        }
        RecognitionType::BusinessCard => {
            "Extract the contact details on this business card: name, title, company, \
             phone numbers, email, website and address, as key: value lines."
        }
        RecognitionType::Math => {
            "Transcribe the mathematical content in this image. Write formulas in LaTeX \
             and keep surrounding text as plain text."
        }
        RecognitionType::Code => {
            "Transcribe the source code in this image exactly, preserving indentation, \
             inside a fenced code block tagged with the language."
        }
        RecognitionType::Ancient => {
            "Transcribe the historical or classical text in this image, keeping original \
             characters. Then give a modern-language rendering."
        }
    }
}

/// Prompt for a request: a non-empty override wins over the template.
pub fn resolve(recognition_type: RecognitionType, prompt_override: Option<&str>) -> String {
    match prompt_override.map(str::trim) {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        _ => template(recognition_type).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_distinct_template() {
        let mut seen = std::collections::HashSet::new();
        for t in RecognitionType::ALL {
            assert!(!template(t).is_empty());
            assert!(seen.insert(template(t)), "duplicate template for {t}");
        }
    }

    #[test]
    fn test_unknown_type_uses_auto_template() {
        let t = RecognitionType::parse_lossy("not-a-real-type");
        assert_eq!(resolve(t, None), template(RecognitionType::Auto));
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve(RecognitionType::Receipt, Some("Just the total.")),
            "Just the total."
        );
    }

    #[test]
    fn test_blank_override_ignored() {
        assert_eq!(
            resolve(RecognitionType::Table, Some("   ")),
            template(RecognitionType::Table)
        );
    }
}
