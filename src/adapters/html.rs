use crate::domain::model::{AllocationRow, Breakdown, PeriodSummary};
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 40px; }
        h1 { border-bottom: 3px solid #333; padding-bottom: 10px; }
        h2 { margin-top: 40px; border-bottom: 1px solid #ccc; }
        table { border-collapse: collapse; width: 100%; margin-top: 10px; }
        th, td { border: 1px solid #ccc; padding: 8px; }
        th { background-color: #f2f2f2; text-align: left; }
        td.num { text-align: right; }
        ul { line-height: 1.8; }
        .empty { color: #666; font-style: italic; }
        .footer { margin-top: 50px; font-size: 12px; color: #666; }
"#;

pub fn report_file_name(period_key: &str) -> String {
    format!("Relatorio_{}.html", sanitize_file_component(period_key))
}

/// Link target for a period report, percent-encoded for use in `href`.
pub fn report_href(period_key: &str) -> String {
    urlencoding::encode(&report_file_name(period_key)).into_owned()
}

/// Replaces characters that are not portable in file names.
pub fn sanitize_file_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "sem_nome".to_string()
    } else {
        cleaned
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `1234.5` -> `1,234.50`
pub fn format_number(value: f64) -> String {
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let fixed = format!("{:.2}", rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && rounded != 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

pub fn format_currency(value: f64) -> String {
    format!("€ {}", format_number(value))
}

fn breakdown_table(out: &mut String, title: &str, breakdown: &Breakdown) {
    let _ = writeln!(out, "    <h2>{}</h2>", escape_html(title));
    if breakdown.is_empty() {
        out.push_str("    <p class=\"empty\">Sem dados.</p>\n");
        return;
    }

    out.push_str("    <table>\n      <tr><th></th><th>Valor (€)</th><th>%</th></tr>\n");
    for row in &breakdown.rows {
        let _ = writeln!(
            out,
            "      <tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{:.1}%</td></tr>",
            escape_html(&row.key),
            format_number(row.value),
            row.share
        );
    }
    let _ = writeln!(
        out,
        "      <tr><th>Total</th><th class=\"num\">{}</th><th class=\"num\">100.0%</th></tr>",
        format_number(breakdown.total())
    );
    out.push_str("    </table>\n");
}

fn allocation_table(out: &mut String, rows: &[AllocationRow]) {
    out.push_str("    <h2>Despesas por Local</h2>\n");
    if rows.is_empty() {
        out.push_str("    <p class=\"empty\">Sem despesas registadas.</p>\n");
        return;
    }

    out.push_str(
        "    <table>\n      <tr><th>Local</th><th>Clientes Ativos</th><th>Direto (€)</th><th>Rateio GERAL (€)</th><th>Total (€)</th></tr>\n",
    );
    for row in rows {
        let location = if row.location.is_empty() {
            "(sem local)".to_string()
        } else {
            escape_html(&row.location)
        };
        let _ = writeln!(
            out,
            "      <tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            location,
            row.active_clients,
            format_number(row.direct),
            format_number(row.allocated),
            format_number(row.total)
        );
    }
    out.push_str("    </table>\n");
}

fn page_open(out: &mut String, title: &str) {
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    <title>{}</title>\n    <style>{}    </style>\n</head>\n<body>\n",
        escape_html(title),
        STYLE
    );
}

fn page_close(out: &mut String) {
    out.push_str("    <p class=\"footer\">Relatório gerado automaticamente.</p>\n</body>\n</html>\n");
}

pub fn render_period_report(summary: &PeriodSummary) -> String {
    let mut out = String::new();
    let period = escape_html(&summary.period);
    page_open(&mut out, &format!("Relatório Financeiro - {}", summary.period));

    let _ = write!(
        out,
        "    <h1>Relatório Financeiro</h1>\n    <p><b>Período:</b> {}</p>\n\n",
        period
    );

    out.push_str("    <h2>Resumo Executivo</h2>\n    <ul>\n");
    let items = [
        ("Valor Total", format_currency(summary.revenue_total)),
        ("Clientes Ativos", summary.active_clients.to_string()),
        ("Perdas", summary.losses.to_string()),
        ("Ticket Médio", format_currency(summary.average_ticket)),
        ("Despesas", format_currency(summary.expense_total)),
        ("Resultado Líquido", format_currency(summary.net_result)),
        ("Registos", summary.record_count.to_string()),
    ];
    for (name, value) in items {
        let _ = writeln!(out, "        <li><b>{}:</b> {}</li>", name, value);
    }
    out.push_str("    </ul>\n\n");

    breakdown_table(&mut out, "Valor por Modalidade", &summary.by_modality);
    breakdown_table(&mut out, "Valor por Tipo", &summary.by_type);
    breakdown_table(&mut out, "Valor por Professor", &summary.by_teacher);
    breakdown_table(&mut out, "Valor por Local", &summary.by_location);
    allocation_table(&mut out, &summary.expenses_by_location);

    page_close(&mut out);
    out
}

pub fn render_index(summaries: &[PeriodSummary]) -> String {
    let mut out = String::new();
    page_open(&mut out, "Relatórios Financeiros");
    out.push_str("    <h1>Relatórios Financeiros</h1>\n");

    out.push_str(
        "    <table>\n      <tr><th>Período</th><th>Valor Total (€)</th><th>Despesas (€)</th><th>Resultado (€)</th><th>Clientes Ativos</th><th>Perdas</th></tr>\n",
    );
    for summary in summaries {
        let _ = writeln!(
            out,
            "      <tr><td><a href=\"{}\">{}</a></td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            report_href(&summary.period),
            escape_html(&summary.period),
            format_number(summary.revenue_total),
            format_number(summary.expense_total),
            format_number(summary.net_result),
            summary.active_clients,
            summary.losses
        );
    }
    out.push_str("    </table>\n");

    page_close(&mut out);
    out
}
