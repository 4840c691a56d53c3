//! Static clinical reference content: guideline links, safety pearls, deprescribing
//! strategies and adverse-effect warning signs.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guideline {
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeprescribingStrategy {
    pub strategy: &'static str,
    pub description: &'static str,
    pub evidence: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdverseEffect {
    pub name: &'static str,
    pub signs: &'static str,
    pub notes: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdverseEffectGroup {
    pub system: &'static str,
    pub effects: &'static [AdverseEffect],
}

pub const KEY_GUIDELINES: &[Guideline] = &[
    Guideline {
        title: "ACG Clinical Guideline for GERD (2022)",
        url: "https://journals.lww.com/ajg/fulltext/2022/01000/american_college_of_gastroenterology_clinical.14.aspx",
    },
    Guideline {
        title: "AGA Clinical Practice Update on PPI Use (2020)",
        url: "https://www.gastrojournal.org/article/S0016-5085(20)30065-5/fulltext",
    },
    Guideline {
        title: "FDA Safety Communications on PPIs",
        url: "https://www.fda.gov/drugs/postmarket-drug-safety-information-patients-and-providers/proton-pump-inhibitors-ppis",
    },
    Guideline {
        title: "Medscape: Proton Pump Inhibitors Overview (2023)",
        url: "https://emedicine.medscape.com/article/1811445-overview",
    },
    Guideline {
        title: "NHS: PPIs for Acid Reflux, Heartburn & GORD (2024)",
        url: "https://www.nhs.uk/medicines/proton-pump-inhibitors/",
    },
    Guideline {
        title: "UpToDate PPI Recommendations",
        url: "https://www.uptodate.com/contents/proton-pump-inhibitors-overview-of-use-and-adverse-effects-in-the-treatment-of-acid-related-disorders",
    },
];

pub const SAFETY_PEARLS: &[&str] = &[
    "Risk of C. difficile infection",
    "Key drug interactions (clopidogrel, warfarin)",
    "Increased fracture risk (long-term use)",
    "Hypomagnesemia and B12 deficiency",
    "Deprescribe if no clear indication",
];

pub const DEPRESCRIBING_STRATEGIES: &[DeprescribingStrategy] = &[
    DeprescribingStrategy {
        strategy: "Dose Reduction",
        description: "Gradually reduce PPI dose (e.g., from twice daily to once daily)",
        evidence: "Recommended for patients on high-dose PPI therapy. May reduce risk of rebound acid hypersecretion",
    },
    DeprescribingStrategy {
        strategy: "On-Demand Therapy",
        description: "Use PPI only when symptoms occur",
        evidence: "Suitable for patients with intermittent symptoms. May lead to increased symptom relapse compared to continuous therapy",
    },
    DeprescribingStrategy {
        strategy: "Switch to H2RA",
        description: "Replace PPI with an H2RA (e.g., ranitidine, famotidine)",
        evidence: "May be considered for patients with mild symptoms. Higher risk of symptom relapse compared to continued PPI use",
    },
    DeprescribingStrategy {
        strategy: "Abrupt Discontinuation",
        description: "Stop PPI therapy without tapering",
        evidence: "May lead to rebound acid hypersecretion and symptom recurrence. Tapering is generally preferred",
    },
];

pub const DEPRESCRIBING_RESOURCES: &[Guideline] = &[
    Guideline {
        title: "AGA Clinical Practice Update on PPI Deprescribing",
        url: "https://www.gastrojournal.org/article/S0016-5085(20)30065-5/fulltext",
    },
    Guideline {
        title: "Deprescribing.org PPI Guidelines",
        url: "https://deprescribing.org/resources/deprescribing-guidelines-algorithms/",
    },
    Guideline {
        title: "FDA Medication Guides",
        url: "https://www.fda.gov/drugs/drug-safety-and-availability/fda-drug-safety-communication-possible-increased-risk-fractures-hip-wrist-and-spine-use-proton-pump",
    },
];

pub const ADVERSE_EFFECTS: &[AdverseEffectGroup] = &[
    AdverseEffectGroup {
        system: "Renal Effects",
        effects: &[
            AdverseEffect {
                name: "Acute Interstitial Nephritis (AIN)",
                signs: "Decreased urine output, blood in urine, fatigue",
                notes: "PPIs are a leading cause of drug-induced AIN; onset can occur weeks to months after initiation. Early recognition is crucial to prevent progression to chronic kidney disease.",
            },
            AdverseEffect {
                name: "Chronic Kidney Disease (CKD)",
                signs: "Fatigue, swelling, elevated creatinine levels",
                notes: "Long-term PPI use has been linked to an increased risk of CKD, independent of AIN. Regular monitoring of renal function is advised for chronic users.",
            },
        ],
    },
    AdverseEffectGroup {
        system: "Gastrointestinal Effects",
        effects: &[
            AdverseEffect {
                name: "Clostridioides difficile Infection (CDI)",
                signs: "Persistent diarrhea, abdominal pain, fever",
                notes: "PPIs increase susceptibility to CDI due to reduced gastric acidity, which impairs the gut's defense against pathogens.",
            },
            AdverseEffect {
                name: "Rebound Acid Hypersecretion",
                signs: "Worsening heartburn or indigestion upon discontinuation",
                notes: "Abrupt cessation after prolonged use may lead to increased gastric acid production. Tapering the dose is recommended to mitigate symptoms.",
            },
        ],
    },
    AdverseEffectGroup {
        system: "Musculoskeletal Effects",
        effects: &[AdverseEffect {
            name: "Bone Fractures (Hip, Spine, Wrist)",
            signs: "Sudden bone pain, fractures from minimal trauma",
            notes: "Long-term PPI use is associated with decreased calcium absorption, leading to increased fracture risk, especially in the elderly.",
        }],
    },
    AdverseEffectGroup {
        system: "Neurological Effects",
        effects: &[
            AdverseEffect {
                name: "Vitamin B12 Deficiency",
                signs: "Fatigue, numbness, memory issues",
                notes: "PPIs can impair B12 absorption, leading to deficiency over prolonged periods. Monitoring B12 levels is advisable for long-term users.",
            },
            AdverseEffect {
                name: "Dementia (Potential Association)",
                signs: "Memory loss, confusion, cognitive decline",
                notes: "Some studies suggest a possible link between extended PPI use and increased dementia risk, though findings are not conclusive.",
            },
        ],
    },
    AdverseEffectGroup {
        system: "Electrolyte Imbalance",
        effects: &[AdverseEffect {
            name: "Hypomagnesemia",
            signs: "Muscle cramps, seizures, arrhythmias",
            notes: "PPIs may cause low magnesium levels, especially when combined with other medications like diuretics. Regular monitoring is recommended for at-risk patients.",
        }],
    },
    AdverseEffectGroup {
        system: "Dermatological/Autoimmune Effects",
        effects: &[AdverseEffect {
            name: "Subacute Cutaneous Lupus Erythematosus (SCLE)",
            signs: "Rash, joint pain, photosensitivity",
            notes: "Rare autoimmune reaction linked to PPI use; symptoms typically resolve upon discontinuation.",
        }],
    },
    AdverseEffectGroup {
        system: "Infectious Effects",
        effects: &[AdverseEffect {
            name: "Community-Acquired Pneumonia",
            signs: "Cough, fever, shortness of breath",
            notes: "Increased risk of pneumonia due to reduced gastric acidity and potential bacterial overgrowth.",
        }],
    },
];

/// Guideline list as bullet lines, `- Title - URL`.
pub fn guideline_bullets() -> String {
    KEY_GUIDELINES
        .iter()
        .map(|g| format!("- {} - {}", g.title, g.url))
        .collect::<Vec<_>>()
        .join("\n")
}
