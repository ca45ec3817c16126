use crate::models::BirthForm;
use crate::transcript::Transcript;

pub const REPORT_TITLE: &str = "JyotishAI Astrological Report";

/// Builds the plain-text report: title, birth details, then one `<Label>: <text>`
/// block per transcript entry.
///
/// Birth details are taken from the live form as typed. The welcome message and
/// entries with no visible text are left out.
pub fn build_report(form: &BirthForm, transcript: &Transcript) -> String {
    let mut report = format!("{REPORT_TITLE}\n\n");

    report.push_str(&format!("Name: {}\n", form.name));
    report.push_str(&format!("Gender: {}\n", form.gender));
    report.push_str(&format!("Date of Birth: {}\n", form.birth_date));
    report.push_str(&format!("Time of Birth: {}\n", form.birth_time));
    report.push_str(&format!("Place of Birth: {}\n\n", form.birth_place));

    for message in transcript.messages().iter().filter(|m| !m.initial) {
        let text = message.text_content();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        report.push_str(&format!("{}: {}\n\n", message.sender.label(), text));
    }

    report
}
