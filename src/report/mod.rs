/// Report rendering collaborator
///
/// Turns a disease label plus its optional reference record into the two
/// PDF documents the service hands out: the treatment plan and the illness
/// information report. Callers receive opaque bytes.
use crate::{
    error::{AppError, AppResult},
    reference::DiseaseInfo,
};
use chrono::Utc;
use printpdf::*;
use std::io::BufWriter;

/// Report collaborator contract
pub trait ReportRenderer: Send + Sync {
    /// Treatment plan report: condition, treatment, prevention, follow-up
    fn render_treatment(
        &self,
        disease: &str,
        info: Option<&DiseaseInfo>,
        username: &str,
    ) -> AppResult<Vec<u8>>;

    /// Illness information report: condition, description, symptoms,
    /// causes, risk factors
    fn render_illness(
        &self,
        disease: &str,
        info: Option<&DiseaseInfo>,
        username: &str,
    ) -> AppResult<Vec<u8>>;
}

/// PDF renderer built on printpdf's builtin fonts
pub struct PdfReportRenderer;

impl ReportRenderer for PdfReportRenderer {
    fn render_treatment(
        &self,
        disease: &str,
        info: Option<&DiseaseInfo>,
        username: &str,
    ) -> AppResult<Vec<u8>> {
        let mut sections: Vec<(&str, Vec<String>)> =
            vec![("Predicted Condition", vec![disease.to_string()])];

        if let Some(info) = info {
            if !info.treatment.is_empty() {
                sections.push(("Treatment Plan", info.treatment.clone()));
            }
            if !info.prevention.is_empty() {
                sections.push(("Prevention Tips", info.prevention.clone()));
            }
        }
        sections.push((
            "When to See a Doctor",
            vec!["Consult a healthcare provider if symptoms persist or worsen.".to_string()],
        ));

        build_report("Clinia Treatment Plan Report", username, &sections)
    }

    fn render_illness(
        &self,
        disease: &str,
        info: Option<&DiseaseInfo>,
        username: &str,
    ) -> AppResult<Vec<u8>> {
        let mut sections: Vec<(&str, Vec<String>)> =
            vec![("Condition", vec![disease.to_string()])];

        if let Some(info) = info {
            if !info.definition.is_empty() {
                sections.push(("Description", info.definition.clone()));
            }
            if !info.symptoms.is_empty() {
                sections.push(("Common Symptoms", info.symptoms.clone()));
            }
            if !info.causes.is_empty() {
                sections.push(("Causes", info.causes.clone()));
            }
            if !info.risk_factors.is_empty() {
                sections.push(("Risk Factors", info.risk_factors.clone()));
            }
        }

        build_report("Clinia Illness Information Report", username, &sections)
    }
}

/// Lay out a single-page A4 report: title, generated-for header, then
/// bulleted sections
fn build_report(
    title: &str,
    username: &str,
    sections: &[(&str, Vec<String>)],
) -> AppResult<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Collaborator(format!("PDF font error: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Collaborator(format!("PDF font error: {}", e)))?;

    let mut y = Mm(280.0);

    layer.use_text(title, 16.0, Mm(20.0), y, &bold);
    y -= Mm(10.0);

    let today = Utc::now().format("%B %d, %Y, %H:%M UTC").to_string();
    layer.use_text(format!("Generated for: {}", username), 10.0, Mm(20.0), y, &font);
    y -= Mm(5.0);
    layer.use_text(format!("Date: {}", today), 10.0, Mm(20.0), y, &font);
    y -= Mm(10.0);

    for (heading, lines) in sections {
        layer.use_text(heading.to_uppercase(), 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for line in lines {
            for wrapped in wrap_text(&format!("  - {}", line), 90) {
                layer.use_text(&wrapped, 9.0, Mm(25.0), y, &font);
                y -= Mm(4.5);
            }
        }
        y -= Mm(4.0);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| AppError::Collaborator(format!("PDF save error: {}", e)))?;
    buf.into_inner()
        .map_err(|e| AppError::Collaborator(format!("PDF buffer error: {}", e)))
}

/// Greedy word wrap at a fixed characters-per-line width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> DiseaseInfo {
        DiseaseInfo {
            definition: vec!["A viral infection of the upper airways.".to_string()],
            symptoms: vec!["Fever".to_string(), "Cough".to_string()],
            causes: vec!["Influenza viruses".to_string()],
            risk_factors: vec!["Close contact with infected people".to_string()],
            treatment: vec!["Rest".to_string(), "Fluids".to_string()],
            prevention: vec!["Annual vaccination".to_string()],
        }
    }

    #[test]
    fn test_reports_are_valid_pdf_documents() {
        let renderer = PdfReportRenderer;
        let info = sample_info();

        let treatment = renderer
            .render_treatment("Influenza", Some(&info), "alice")
            .unwrap();
        let illness = renderer
            .render_illness("Influenza", Some(&info), "alice")
            .unwrap();

        assert!(treatment.starts_with(b"%PDF"));
        assert!(illness.starts_with(b"%PDF"));
        assert_ne!(treatment, illness);
    }

    #[test]
    fn test_reports_render_without_reference_data() {
        let renderer = PdfReportRenderer;
        let bytes = renderer.render_treatment("Influenza", None, "alice").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("one two three four five six seven", 10);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 10));
    }
}
