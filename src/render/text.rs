use super::{Badge, SectionView, Tone};
use crate::models::{AnalysisResult, HealthStatus, Language, LlmStatus};

/// Strips terminal control sequences and control characters from one line
/// of server-supplied text. Line breaks and tabs become spaces.
pub fn sanitize_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => skip_escape(&mut chars),
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Multi-line variant: splits on line breaks and sanitizes each line.
/// Runs of blank lines collapse to one.
pub fn sanitize_block(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = sanitize_inline(raw);
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

// ESC [ ... final byte, ESC ] ... BEL or ESC \, or a two-byte ESC sequence.
fn skip_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    match chars.next() {
        Some('[') => {
            for c in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&c) {
                    break;
                }
            }
        }
        Some(']') => {
            while let Some(c) = chars.next() {
                if c == '\u{07}' {
                    break;
                }
                if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        _ => {}
    }
}

pub fn render_summary(summary: &str, language: Language) -> SectionView {
    let lines = sanitize_block(summary);
    if lines.is_empty() {
        return SectionView::placeholder(
            language.pick("요약", "Summary"),
            language.pick("요약이 없습니다", "No summary available"),
        );
    }
    let mut view = SectionView::new(language.pick("요약", "Summary"));
    view.lines = lines;
    view
}

pub fn render_narrative(result: &AnalysisResult, language: Language) -> SectionView {
    let title = language.pick("분석 설명", "Narrative");
    let lines = result
        .explanation
        .as_deref()
        .map(sanitize_block)
        .unwrap_or_default();
    if lines.is_empty() {
        return SectionView::placeholder(
            title,
            language.pick("설명이 없습니다", "No narrative available"),
        );
    }
    let mut view = SectionView::new(title);
    if let Some(source) = result.meta.source.as_deref() {
        view.badges
            .push(Badge::new(sanitize_inline(source), Tone::Neutral));
    }
    view.lines = lines;
    view
}

fn llm_label(name: &str, status: &LlmStatus) -> String {
    let provider = status
        .provider
        .as_deref()
        .map(sanitize_inline)
        .filter(|p| !p.is_empty());
    if status.ready {
        match provider {
            Some(p) => format!("{name} ready ({p})"),
            None => format!("{name} ready"),
        }
    } else {
        match status.reason.as_deref().map(sanitize_inline) {
            Some(reason) if !reason.is_empty() => format!("{name} down: {reason}"),
            _ => format!("{name} down"),
        }
    }
}

/// One-line service status for the header.
pub fn render_health(health: &HealthStatus) -> (String, Tone) {
    let mut parts = vec![if health.is_ok() {
        "API ok".to_string()
    } else {
        format!("API {}", sanitize_inline(&health.status))
    }];
    if let Some(finance) = &health.finance_llm {
        parts.push(llm_label("finance LLM", finance));
    }
    if let Some(agent) = &health.agent_llm {
        parts.push(llm_label("agent LLM", agent));
    }
    let tone = if health.is_ok() {
        Tone::Positive
    } else {
        Tone::Caution
    };
    (parts.join(" · "), tone)
}
