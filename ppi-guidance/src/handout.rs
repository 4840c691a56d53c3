//! Patient education handouts.

/// Medications a handout can be generated for.
pub const SUPPORTED_PPIS: [&str; 4] = ["Omeprazole", "Esomeprazole", "Lansoprazole", "Pantoprazole"];

/// Conditions a handout can be generated for.
pub const SUPPORTED_INDICATIONS: [&str; 3] = ["GERD", "Peptic Ulcer", "H. pylori Infection"];

pub fn is_supported_ppi(ppi: &str) -> bool {
    SUPPORTED_PPIS.contains(&ppi)
}

pub fn is_supported_indication(indication: &str) -> bool {
    SUPPORTED_INDICATIONS.contains(&indication)
}

/// Markdown handout explaining `ppi` to a patient being treated for `indication`.
pub fn generate_patient_handout(ppi: &str, indication: &str) -> String {
    format!(
        r#"# Patient Guide: {ppi} for {indication}

## About Your Medication
{ppi} belongs to a group of medicines called Proton Pump Inhibitors (PPIs). These medications work by reducing the amount of acid your stomach produces.

## Important Information
- Take this medication at least 30-60 minutes before meals
- Complete the full course as prescribed by your healthcare provider
- Do not stop taking this medication without consulting your healthcare provider

## Common Side Effects
- Headache
- Nausea
- Diarrhea
- Stomach pain
- Vomiting
- Gas

## When to Seek Medical Attention
Seek immediate medical attention if you experience:
- Severe diarrhea
- Unexplained weight loss
- Difficulty swallowing
- Chest pain
- Blood in stool

## Lifestyle Modifications
1. Maintain a healthy weight
2. Avoid trigger foods
3. Eat smaller meals
4. Avoid lying down for 2-3 hours after meals
5. Elevate the head of your bed

## Follow-up Care
- Keep all scheduled follow-up appointments
- Report any new or worsening symptoms
- Discuss any concerns about your medication

For more information, visit:
- [FDA Medication Guide](https://www.fda.gov)
- [ACG Patient Resources](https://gi.org)
- [NIH Health Information](https://www.nih.gov)
"#
    )
}

/// Download name for a handout, e.g. `Omeprazole_H._pylori_Infection_Guide.md`.
pub fn handout_file_name(ppi: &str, indication: &str) -> String {
    let sanitize = |part: &str| -> String {
        part.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };

    format!("{}_{}_Guide.md", sanitize(ppi), sanitize(indication))
}
