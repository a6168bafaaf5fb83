//! Self-contained HTML rendering of a [`Prediction`].

use super::Prediction;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
.verdict{font-size:1.6em;font-weight:bold;padding:.4em .8em;border-radius:6px;display:inline-block}\
.good{background:#d7f5dd;color:#14612a}.bad{background:#fbe0e0;color:#8a1c1c}\
table{border-collapse:collapse;margin-top:1em}td,th{border:1px solid #ccc;padding:.3em .8em;text-align:left}\
th{background:#f3f3f3}.meta{color:#777;font-size:.85em}";

pub struct InvestmentReport;

impl InvestmentReport {
    /// Render the verdict, the 5-year estimate and the full feature vector.
    pub fn render_html(prediction: &Prediction, generated_at: &str) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Investment Report</title>\n");
        html.push_str(&format!("<style>{STYLE}</style>\n"));
        html.push_str("</head>\n<body>\n<h1>Investment Report</h1>\n");

        let class = if prediction.good_investment { "good" } else { "bad" };
        html.push_str(&format!(
            "<div class=\"verdict {class}\">{}</div>\n",
            escape_html(&prediction.label)
        ));
        html.push_str(&format!(
            "<p>Probability of good investment: <strong>{:.1}%</strong></p>\n",
            prediction.probability * 100.0
        ));
        html.push_str(&format!(
            "<p>Estimated price in 5 years: <strong>{:.2} Lakhs</strong></p>\n",
            prediction.future_price
        ));

        html.push_str("<h2>Feature vector</h2>\n<table>\n<tr><th>Feature</th><th>Value</th></tr>\n");
        for feature in &prediction.features {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape_html(&feature.name),
                escape_html(&feature.value)
            ));
        }
        html.push_str("</table>\n");
        html.push_str(&format!(
            "<p class=\"meta\">Generated {}</p>\n</body>\n</html>\n",
            escape_html(generated_at)
        ));
        html
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
