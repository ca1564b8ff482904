//! Guidance text shown when choosing a template.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateDescription {
    pub title: &'static str,
    pub description: &'static str,
    pub choose_if: &'static [&'static str],
    pub ideal_for: &'static str,
}

const DESCRIPTIONS: &[(&str, TemplateDescription)] = &[
    (
        "Blue Template",
        TemplateDescription {
            title: "Professional Blue Template",
            description: "A clean, professional template with a modern blue colour scheme. \
                Balanced typography and clear section separation.",
            choose_if: &[
                "You want a professional, corporate look",
                "Your research has a formal tone",
                "You prefer clean, minimalist design",
                "Your content is data-heavy",
            ],
            ideal_for: "Professional conferences, corporate presentations and formal research showcases.",
        },
    ),
    (
        "Green Template",
        TemplateDescription {
            title: "Modern Green Template",
            description: "A contemporary template with a fresh green palette and left-aligned \
                typography. Approachable while keeping professional rigour.",
            choose_if: &[
                "You want a modern, fresh appearance",
                "Your research has an environmental or health focus",
                "You prefer left-aligned, easy-to-read layouts",
                "You want to stand out from traditional blue templates",
            ],
            ideal_for: "Environmental studies, health sciences and modern professional presentations.",
        },
    ),
    (
        "Headline Impact Template",
        TemplateDescription {
            title: "Headline Impact Template",
            description: "A bold poster that puts your key message first. Use it when the research \
                has one standout finding the audience should remember.",
            choose_if: &[
                "You want to lead with a headline result; highlighted words stand out in colour",
                "Two prominent figure boxes should carry your central findings",
                "You are presenting to a broad or mixed audience",
                "You need a compact format with quick impact",
            ],
            ideal_for: "Left-to-right storytelling with structured sections, a references footer \
                and space for a QR code linking to the full paper.",
        },
    ),
    (
        "Personal Blue Basic",
        TemplateDescription {
            title: "Personal Blue Basic Template",
            description: "A straightforward blue layout that keeps attention on the content.",
            choose_if: &[
                "You want a simple design that won't distract from your content",
                "You prefer traditional poster layouts",
                "Your research could be of any type",
                "You want something professional but not flashy",
            ],
            ideal_for: "General presentations, thesis defences and research suited to a traditional layout.",
        },
    ),
    (
        "Clean 5-Panel Flow Template",
        TemplateDescription {
            title: "Clean 5-Panel Flow Template",
            description: "A structured five-panel layout for research with a clear sequential flow.",
            choose_if: &[
                "Your research has distinct phases or sequential steps",
                "You want a structured, easy-to-follow layout",
                "You have several key findings to present",
                "You prefer organised, systematic presentation",
            ],
            ideal_for: "Process-based research, multi-phase studies and sequential work.",
        },
    ),
    (
        "Cyan Flow Template",
        TemplateDescription {
            title: "Cyan Flow Template",
            description: "A modern layout around a central visual, with sections for flow, methods \
                and discussion.",
            choose_if: &[
                "Your study has a standout figure you want to highlight",
                "You want to guide the viewer through your research process",
                "Your project is methodology-driven or process-oriented",
                "You want a visual but professional feel",
            ],
            ideal_for: "Qualitative studies, intervention development, visual frameworks and \
                research with a strong narrative arc.",
        },
    ),
    (
        "Modular Impact",
        TemplateDescription {
            title: "Modular Impact Template",
            description: "A double-column layout with numbered sections, clear typography and \
                colour to guide the reader, plus room for figures, future work and references.",
            choose_if: &[
                "You want a linear narrative from background to conclusion",
                "Your poster has several figures that need clean placement",
                "You need clear sectioning with standout numbering",
                "You value a polished, conference-ready hierarchy",
            ],
            ideal_for: "Quantitative scientific posters and student project presentations.",
        },
    ),
    (
        "Emerald Headline Template",
        TemplateDescription {
            title: "Emerald Headline Template",
            description: "A modern layout with a high-impact headline, strong colour blocks and a \
                flowchart-style methods section.",
            choose_if: &[
                "You want to lead with an engaging headline finding",
                "You need to show a multi-stage process such as intervention phases",
                "You want a contemporary, design-forward look",
                "You want to keep content brief and visual",
            ],
            ideal_for: "Digital health, implementation research and applied studies with a clear \
                call to action.",
        },
    ),
];

pub fn describe(name: &str) -> Option<&'static TemplateDescription> {
    DESCRIPTIONS.iter().find(|(n, _)| *n == name).map(|(_, d)| d)
}

pub fn all() -> impl Iterator<Item = (&'static str, &'static TemplateDescription)> {
    DESCRIPTIONS.iter().map(|(n, d)| (*n, d))
}
