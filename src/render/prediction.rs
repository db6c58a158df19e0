use super::text::sanitize_inline;
use super::{Badge, Field, SectionView, Tone};
use crate::models::{Language, PredictionResult, Signal};
use chrono::DateTime;

/// `+1.23%` / `-0.40%`; `N/A` for missing or NaN input. `x` is a fraction.
pub fn format_percent(x: Option<f64>) -> String {
    match x {
        Some(x) if x.is_finite() => {
            let sign = if x >= 0.0 { "+" } else { "-" };
            format!("{}{:.2}%", sign, (x * 100.0).abs())
        }
        _ => "N/A".to_string(),
    }
}

/// Prices are shown as the server sent them.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.is_finite() => p.to_string(),
        _ => "N/A".to_string(),
    }
}

fn signal_tone(signal: Signal) -> Tone {
    match signal {
        Signal::Buy => Tone::Positive,
        Signal::Sell => Tone::Negative,
        Signal::Hold => Tone::Neutral,
    }
}

pub fn render_prediction(prediction: &PredictionResult, language: Language) -> SectionView {
    let title = language.pick("가격 예측", "Prediction");

    if let Some(error) = prediction.error.as_deref() {
        let mut view = SectionView::placeholder(
            title,
            language.pick("예측 실패", "Prediction failed"),
        );
        let detail = sanitize_inline(error);
        if !detail.is_empty() {
            view.lines.push(detail);
        }
        return view;
    }

    let mut view = SectionView::new(title);
    if let Some(symbol) = prediction.symbol.as_deref().map(sanitize_inline) {
        if !symbol.is_empty() {
            view.badges.push(Badge::new(symbol, Tone::Neutral));
        }
    }
    view.badges.push(Badge::new(
        prediction.signal.label(),
        signal_tone(prediction.signal),
    ));

    if prediction.last_close.is_some() {
        view.fields.push(Field::new(
            language.pick("전일 종가", "Last close"),
            format_price(prediction.last_close),
        ));
    }
    if prediction.live_price.is_some() {
        view.fields.push(Field::new(
            language.pick("실시간 가격", "Live price"),
            format_price(prediction.live_price),
        ));
    }
    if let Some(ret) = prediction.pred_ret_1d {
        let tone = if ret >= 0.0 {
            Tone::Positive
        } else {
            Tone::Negative
        };
        let mut field = Field::new(
            language.pick("예상 수익률 (1일)", "Predicted return (1d)"),
            format_percent(Some(ret)),
        );
        field.tag = Some(Badge::new(prediction.signal.label(), tone));
        view.fields.push(field);
    }
    if prediction.pred_close_1d.is_some() {
        view.fields.push(Field::new(
            language.pick("예상 종가 (1일)", "Predicted close (1d)"),
            format_price(prediction.pred_close_1d),
        ));
    }
    if let Some(at) = prediction.ts.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        view.lines.push(format!(
            "{} {}",
            language.pick("생성 시각", "Generated"),
            at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    view
}
