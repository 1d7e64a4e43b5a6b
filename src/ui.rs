use crate::dashboard::{ChartGroup, DashboardState, Tab, chart_groups};
use crate::money::Money;
use std::fmt::Write;

pub fn render_index(state: &DashboardState) -> String {
    fill_template(INDEX_HTML, |name| match name {
        "TABS" => Some(render_tabs(state.tab)),
        "NOTICE" => Some(render_notice(state)),
        "CARDS" => Some(render_cards(state)),
        "FORM" => Some(render_form(state)),
        "CHART" => Some(render_chart(&chart_groups(&state.summary))),
        _ => None,
    })
}

/// Substitutes `{{NAME}}` markers in one pass over `template`. Inserted
/// fragments are never scanned again, so user text that looks like a marker
/// stays literal. Unknown markers are kept as written.
fn fill_template(template: &str, fragment: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        match fragment(&after[..end]) {
            Some(rendered) => out.push_str(&rendered),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn render_tabs(active: Tab) -> String {
    let mut out = String::new();
    for (tab, label) in [
        (Tab::Daily, "🗓️ Gastos Diários"),
        (Tab::Weekly, "📅 Ganhos Semanais"),
    ] {
        let class = if tab == active { "tab active" } else { "tab" };
        let _ = write!(
            out,
            r#"<a class="{class}" href="/?tab={}" aria-selected="{}">{label}</a>"#,
            tab.as_str(),
            tab == active
        );
    }
    out
}

fn render_notice(state: &DashboardState) -> String {
    match &state.notice {
        Some(notice) => format!(
            r#"<div class="status" data-type="{}" role="status">{}</div>"#,
            if notice.is_error() { "error" } else { "ok" },
            escape_html(notice.message())
        ),
        None => String::new(),
    }
}

fn render_cards(state: &DashboardState) -> String {
    let summary = &state.summary;
    let mut out = summary_card(
        "Resumo Mensal",
        summary.monthly.gross,
        summary.monthly.expenses,
        summary.monthly.net,
    );
    for week in &summary.weekly {
        out.push_str(&summary_card(
            &format!("Semana {}", week.week),
            week.gross,
            week.expenses,
            week.net,
        ));
    }
    if summary.unattributed_expenses > Money::ZERO {
        let _ = write!(
            out,
            r#"<p class="hint">Gastos fora de qualquer semana: {}</p>"#,
            summary.unattributed_expenses.format_brl()
        );
    }
    out
}

fn summary_card(title: &str, gross: Money, expenses: Money, net: Money) -> String {
    format!(
        r#"<div class="stat">
          <h3>{}</h3>
          <p>Bruto: <span class="value">{}</span></p>
          <p>Gastos: <span class="value">{}</span></p>
          <p>Líquido: <span class="value net">{}</span></p>
        </div>"#,
        escape_html(title),
        gross.format_brl(),
        expenses.format_brl(),
        net.format_brl()
    )
}

fn render_form(state: &DashboardState) -> String {
    match state.tab {
        Tab::Daily => {
            let form = &state.expense_form;
            format!(
                r#"<form class="form" method="post" action="/forms/daily-expense">
        <label>📅 Data <input type="date" name="date" value="{}" required /></label>
        <label>💸 Valor Gasto (R$) <input type="number" step="0.01" min="0" name="amount" value="{}" required /></label>
        <label>📝 Descrição <input type="text" name="description" value="{}" required /></label>
        <button class="btn-add" type="submit">💾 Salvar Gasto Diário</button>
      </form>"#,
                escape_html(&form.date),
                escape_html(&form.amount),
                escape_html(&form.description)
            )
        }
        Tab::Weekly => {
            let form = &state.earning_form;
            format!(
                r#"<form class="form" method="post" action="/forms/weekly-earning">
        <label>🔢 Número da Semana <input type="number" min="1" max="5" name="weekNumber" value="{}" required /></label>
        <label>💰 Valor Bruto (R$) <input type="number" step="0.01" min="0" name="grossAmount" value="{}" required /></label>
        <label>⏳ Data Início <input type="date" name="startDate" value="{}" required /></label>
        <label>⌛ Data Fim <input type="date" name="endDate" value="{}" required /></label>
        <button class="btn-add" type="submit">💾 Salvar Ganho Semanal</button>
      </form>"#,
                escape_html(&form.week_number),
                escape_html(&form.gross_amount),
                escape_html(&form.start_date),
                escape_html(&form.end_date)
            )
        }
    }
}

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 300.0;
const PAD_LEFT: f64 = 64.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_TOP: f64 = 24.0;
const PAD_BOTTOM: f64 = 40.0;

const SERIES: [(&str, &str); 3] = [
    ("gross", "Ganhos Brutos (R$)"),
    ("expenses", "Gastos Totais (R$)"),
    ("net", "Lucro Líquido (R$)"),
];

fn render_chart(groups: &[ChartGroup]) -> String {
    let mut svg = format!(
        r#"<svg class="chart" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" role="img" aria-label="Desempenho Financeiro Semanal">"#
    );

    if groups.is_empty() {
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="50%" y="50%" text-anchor="middle">Nenhum ganho semanal registrado</text></svg>"#
        );
        return svg;
    }

    let values: Vec<f64> = groups
        .iter()
        .flat_map(|group| [group.gross, group.expenses, group.net])
        .map(Money::to_decimal)
        .collect();
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let mut max = values.iter().copied().fold(0.0_f64, f64::max);
    if max == min {
        max = min + 1.0;
    }

    let plot_width = CHART_WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_height = CHART_HEIGHT - PAD_TOP - PAD_BOTTOM;
    let scale = plot_height / (max - min);
    let y = |value: f64| PAD_TOP + (max - value) * scale;

    let ticks = 4;
    for i in 0..=ticks {
        let value = min + (max - min) * f64::from(i) / f64::from(ticks);
        let y_pos = y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PAD_LEFT}" y1="{y_pos:.2}" x2="{:.2}" y2="{y_pos:.2}" /><text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="end">{value:.0}</text>"#,
            CHART_WIDTH - PAD_RIGHT,
            PAD_LEFT - 8.0,
            y_pos + 4.0
        );
    }

    let group_width = plot_width / groups.len() as f64;
    let bar_width = group_width * 0.8 / SERIES.len() as f64;
    let zero = y(0.0);

    for (index, group) in groups.iter().enumerate() {
        let group_x = PAD_LEFT + group_width * index as f64 + group_width * 0.1;
        for (slot, ((class, _), amount)) in SERIES
            .iter()
            .zip([group.gross, group.expenses, group.net])
            .enumerate()
        {
            let value_y = y(amount.to_decimal());
            let x = group_x + bar_width * slot as f64;
            let _ = write!(
                svg,
                r#"<rect class="bar {class}" x="{x:.2}" y="{:.2}" width="{bar_width:.2}" height="{:.2}"><title>{}</title></rect>"#,
                value_y.min(zero),
                (value_y - zero).abs(),
                amount.format_brl()
            );
        }
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            PAD_LEFT + group_width * (index as f64 + 0.5),
            CHART_HEIGHT - PAD_BOTTOM + 20.0,
            escape_html(&group.label)
        );
    }

    let _ = write!(
        svg,
        r#"<line class="chart-axis" x1="{PAD_LEFT}" y1="{zero:.2}" x2="{:.2}" y2="{zero:.2}" /></svg>"#,
        CHART_WIDTH - PAD_RIGHT
    );

    svg.push_str(r#"<div class="legend">"#);
    for (class, label) in SERIES {
        let _ = write!(
            svg,
            r#"<span class="legend-item"><i class="swatch {class}"></i>{label}</span>"#
        );
    }
    svg.push_str("</div>");
    svg
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Controle Financeiro - Lanchonete</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --gross: #00bcd4;
      --expenses: #ff5722;
      --net: #4caf50;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.6rem);
      margin: 0;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .stat h3 {
      margin: 0 0 8px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat p {
      margin: 4px 0;
    }

    .stat .value {
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.net {
      color: var(--accent);
    }

    .form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
      align-items: end;
    }

    .form label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #5f5c57;
    }

    .form input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 12px;
      padding: 10px 12px;
      font: inherit;
    }

    button,
    .download {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      text-decoration: none;
      display: inline-flex;
      align-items: center;
      justify-content: center;
      gap: 10px;
    }

    .btn-add {
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
    }

    .download {
      background: var(--accent-2);
      color: white;
      box-shadow: 0 10px 24px rgba(47, 72, 88, 0.3);
    }

    .chart-card {
      background: white;
      border-radius: 22px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .chart-card h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .chart {
      width: 100%;
      height: auto;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-axis {
      stroke: rgba(47, 72, 88, 0.5);
    }

    .chart-label {
      fill: #8b857d;
      font-size: 12px;
    }

    .bar.gross, .swatch.gross { fill: var(--gross); background: var(--gross); }
    .bar.expenses, .swatch.expenses { fill: var(--expenses); background: var(--expenses); }
    .bar.net, .swatch.net { fill: var(--net); background: var(--net); }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 16px;
      margin-top: 10px;
      font-size: 0.9rem;
    }

    .swatch {
      display: inline-block;
      width: 12px;
      height: 12px;
      border-radius: 3px;
      margin-right: 6px;
    }

    .status {
      padding: 12px 16px;
      border-radius: 14px;
      font-weight: 500;
    }

    .status[data-type="ok"] {
      background: rgba(76, 175, 80, 0.12);
      color: #2e7d32;
    }

    .status[data-type="error"] {
      background: rgba(255, 87, 34, 0.12);
      color: #c63f17;
    }

    .hint {
      margin: 0;
      font-size: 0.9rem;
      color: #7a746d;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>📊 Controle Financeiro - Lanchonete</h1>
      <nav class="tabs" role="tablist">{{TABS}}</nav>
    </header>
    {{NOTICE}}
    <section class="panel">{{CARDS}}</section>
    <section>{{FORM}}</section>
    <section class="chart-card">
      <h2>Desempenho Financeiro Semanal</h2>
      {{CHART}}
    </section>
    <div>
      <a class="download" href="/api/report" download>📥 Baixar Planilha Completa</a>
    </div>
  </main>
</body>
</html>
"#;
