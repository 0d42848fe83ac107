use std::collections::HashMap;

use anyhow::Result;
use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};

use bird_concern::context::AppContext;
use bird_concern_common::input::{
    ANALYSED_BOUNDS, CURRENT_ANNUAL_CHANGE_BOUNDS, LONG_TERM_TREND_BOUNDS,
};
use bird_concern_common::schema::*;
use bird_concern_common::{FormState, Panel, PanelView, SummaryTable};

use crate::io::save_csv;
use crate::model::{DashboardState, PredictionOutcome};

const SINGLE_SELECTS: &[(&str, &str)] = &[
    (IUCN_STATUS, "IUCN Status"),
    (WLPA_SCHEDULE, "WLPA Schedule"),
    (LONG_TERM_STATUS, "Long-Term Status"),
    (CURRENT_STATUS, "Current Status"),
    (DISTRIBUTION_STATUS, "Distribution Status"),
    (DIET, "Diet"),
    (HABITAT_TYPE, "Habitat Type"),
    (ENDEMICITY_TYPE, "Endemicity Type"),
    (BIRD_TYPE, "Bird Type"),
];

const PALETTE: [Color32; 8] = [
    Color32::from_rgb(99, 110, 250),
    Color32::from_rgb(239, 85, 59),
    Color32::from_rgb(0, 204, 150),
    Color32::from_rgb(171, 99, 250),
    Color32::from_rgb(255, 161, 90),
    Color32::from_rgb(25, 211, 243),
    Color32::from_rgb(255, 102, 146),
    Color32::from_rgb(182, 232, 128),
];

const LABEL_WIDTH: f32 = 140.0;
const BAR_HEIGHT: f32 = 16.0;

pub struct DashboardApp {
    ctx: AppContext,
    state: DashboardState,
    /// 列ごとの選択肢（起動時に確定）
    domains: HashMap<&'static str, Vec<String>>,
}

impl DashboardApp {
    pub fn new(ctx: AppContext) -> Result<Self> {
        let mut domains = HashMap::new();
        for column in FEATURE_COLUMNS {
            domains.insert(column, ctx.table().unique(column)?);
        }
        let form = FormState::with_defaults(ctx.table())?;
        Ok(Self {
            ctx,
            state: DashboardState {
                form,
                ..Default::default()
            },
            domains,
        })
    }

    fn refresh_views(&mut self) {
        if !self.state.needs_refresh() {
            return;
        }
        let spec = self.state.filter_spec();
        match self.ctx.summarize(&spec) {
            Ok(views) => self.state.views = views,
            Err(err) => self.state.status = format!("Summary failed: {err}"),
        }
        self.state.applied = Some(spec);
    }

    fn predict(&mut self) {
        let input = self.state.form.collect();
        self.state.prediction = Some(match self.ctx.predict(&input) {
            Ok(result) => PredictionOutcome::Tier(result.tier),
            Err(err) => PredictionOutcome::Failed(err.to_string()),
        });
    }

    /// 入力欄を描画し、予測ボタンが押されたら true
    fn render_inputs(&mut self, ui: &mut egui::Ui) -> bool {
        let before = self.state.form.clone();
        let empty = Vec::new();
        let domain = |c: &str| self.domains.get(c).unwrap_or(&empty);
        let form = &mut self.state.form;

        multi_select(ui, "Group", domain(GROUP), &mut form.group);

        for &(column, label) in SINGLE_SELECTS {
            if let Some(slot) = form.single_select_mut(column) {
                combo(ui, label, domain(column), slot);
            }
        }

        ui.label("Analysed Long-Term");
        let mut v = form.analysed_long_term();
        let range = ANALYSED_BOUNDS.min as i64..=ANALYSED_BOUNDS.max as i64;
        if ui.add(egui::DragValue::new(&mut v).clamp_range(range.clone())).changed() {
            form.set_analysed_long_term(v);
        }

        ui.label("Analysed Current");
        let mut v = form.analysed_current();
        if ui.add(egui::DragValue::new(&mut v).clamp_range(range)).changed() {
            form.set_analysed_current(v);
        }

        let mut trend = form.long_term_trend();
        let slider = egui::Slider::new(&mut trend, LONG_TERM_TREND_BOUNDS.min..=LONG_TERM_TREND_BOUNDS.max)
            .text("Long-Term Trend (%)");
        if ui.add(slider).changed() {
            form.set_long_term_trend(trend);
        }

        let mut change = form.current_annual_change();
        let slider = egui::Slider::new(
            &mut change,
            CURRENT_ANNUAL_CHANGE_BOUNDS.min..=CURRENT_ANNUAL_CHANGE_BOUNDS.max,
        )
        .text("Current Annual Change (%)");
        if ui.add(slider).changed() {
            form.set_current_annual_change(change);
        }

        multi_select(ui, "Migratory Status", domain(MIGRATORY_STATUS), &mut form.migratory_status);

        let changed = *form != before;
        if changed {
            self.state.inputs_changed();
        }

        ui.add_space(8.0);
        ui.button("Predict Conservation Concern").clicked()
    }

    fn render_prediction(&self, ui: &mut egui::Ui) {
        match &self.state.prediction {
            Some(PredictionOutcome::Tier(tier)) => {
                let color = match tier.as_str() {
                    "High" => Color32::from_rgb(239, 85, 59),
                    "Medium" => Color32::from_rgb(246, 196, 69),
                    _ => Color32::from_rgb(0, 204, 150),
                };
                ui.label(
                    RichText::new(format!("Predicted Conservation Concern: {tier}"))
                        .color(color)
                        .size(18.0)
                        .strong(),
                );
            }
            Some(PredictionOutcome::Failed(message)) => {
                ui.label(RichText::new(format!("Prediction failed: {message}")).color(Color32::RED));
            }
            None => {}
        }
    }
}

fn combo(ui: &mut egui::Ui, label: &str, values: &[String], slot: &mut String) {
    egui::ComboBox::from_label(label)
        .selected_text(slot.clone())
        .show_ui(ui, |ui| {
            for value in values {
                ui.selectable_value(slot, value.clone(), value.as_str());
            }
        });
}

/// チェックボックスによる複数選択（選択順を保持）
fn multi_select(ui: &mut egui::Ui, label: &str, options: &[String], selected: &mut Vec<String>) {
    egui::CollapsingHeader::new(format!("{label} ({})", selected.len()))
        .id_source(label)
        .show(ui, |ui| {
            egui::ScrollArea::vertical()
                .id_source(format!("{label}_scroll"))
                .max_height(180.0)
                .show(ui, |ui| {
                    for option in options {
                        let mut checked = selected.contains(option);
                        if ui.checkbox(&mut checked, option.as_str()).changed() {
                            if checked {
                                selected.push(option.clone());
                            } else {
                                selected.retain(|s| s != option);
                            }
                        }
                    }
                });
        });
}

fn bar_row(ui: &mut egui::Ui, label: &str, segments: &[(f32, Color32)], max: f32, total: i64) {
    ui.horizontal(|ui| {
        ui.add_sized([LABEL_WIDTH, BAR_HEIGHT], egui::Label::new(label));
        let width = (ui.available_width() - 50.0).max(40.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, BAR_HEIGHT), egui::Sense::hover());
        let mut x = rect.left();
        for (value, color) in segments {
            let w = if max > 0.0 { rect.width() * value / max } else { 0.0 };
            let segment = egui::Rect::from_min_size(egui::pos2(x, rect.top()), egui::vec2(w, rect.height()));
            ui.painter().rect_filled(segment, 2.0, *color);
            x += w;
        }
        ui.label(total.to_string());
    });
}

fn legend(ui: &mut egui::Ui, series: &[String]) {
    ui.horizontal_wrapped(|ui| {
        for (i, name) in series.iter().enumerate() {
            ui.label(RichText::new("■").color(PALETTE[i % PALETTE.len()]));
            ui.label(name.as_str());
        }
    });
}

/// (ラベル, 件数) の表を横棒で描画
fn draw_pairs(ui: &mut egui::Ui, table: &SummaryTable) {
    let pairs = table.pairs();
    let max = pairs.iter().map(|(_, c)| *c).max().unwrap_or(0) as f32;
    for (i, (label, count)) in pairs.iter().enumerate() {
        bar_row(ui, label, &[(*count as f32, PALETTE[i % PALETTE.len()])], max, *count);
    }
}

/// クロス集計を積み上げ横棒で描画
fn draw_stacked(ui: &mut egui::Ui, table: &SummaryTable) {
    let series: Vec<String> = table.headers().iter().skip(1).cloned().collect();
    let max = table
        .rows()
        .iter()
        .map(|r| r.counts.iter().sum::<i64>())
        .max()
        .unwrap_or(0) as f32;
    legend(ui, &series);
    for row in table.rows() {
        let segments: Vec<(f32, Color32)> = row
            .counts
            .iter()
            .enumerate()
            .map(|(i, c)| (*c as f32, PALETTE[i % PALETTE.len()]))
            .collect();
        bar_row(ui, &row.labels[0], &segments, max, row.counts.iter().sum());
    }
}

/// 縦持ち (グループ, 系列, 件数) をグループごとの棒で描画
fn draw_grouped(ui: &mut egui::Ui, table: &SummaryTable) {
    let mut groups: Vec<&str> = Vec::new();
    let mut series: Vec<String> = Vec::new();
    for row in table.rows() {
        if !groups.contains(&row.labels[0].as_str()) {
            groups.push(&row.labels[0]);
        }
        if !series.contains(&row.labels[1]) {
            series.push(row.labels[1].clone());
        }
    }
    let max = table.rows().iter().map(|r| r.counts[0]).max().unwrap_or(0) as f32;

    legend(ui, &series);
    for group in groups {
        ui.label(RichText::new(group).strong());
        for row in table.rows().iter().filter(|r| r.labels[0] == group) {
            let i = series.iter().position(|s| *s == row.labels[1]).unwrap_or(0);
            bar_row(ui, &row.labels[1], &[(row.counts[0] as f32, PALETTE[i % PALETTE.len()])], max, row.counts[0]);
        }
    }
}

fn data_grid(ui: &mut egui::Ui, id: &str, table: &SummaryTable) {
    egui::Grid::new(id).striped(true).show(ui, |ui| {
        for header in table.headers() {
            ui.label(RichText::new(header.as_str()).strong());
        }
        ui.end_row();
        for row in table.rows() {
            for label in &row.labels {
                ui.label(label.as_str());
            }
            for count in &row.counts {
                ui.label(count.to_string());
            }
            ui.end_row();
        }
    });
}

fn render_panel(ui: &mut egui::Ui, view: &PanelView, status: &mut String) {
    ui.heading(view.panel.title());
    if view.table.is_empty() {
        ui.label(RichText::new("No matching records").color(Color32::from_gray(150)));
    } else {
        match view.panel {
            Panel::DietBirdType => draw_stacked(ui, &view.table),
            Panel::GroupVsIucn => draw_grouped(ui, &view.table),
            _ => draw_pairs(ui, &view.table),
        }
    }

    egui::CollapsingHeader::new("📄 View Data")
        .id_source(view.panel.file_name())
        .show(ui, |ui| {
            data_grid(ui, view.panel.sheet_name(), &view.table);
            if ui.button("Download CSV").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .set_file_name(view.panel.file_name())
                    .add_filter("CSV", &["csv"])
                    .save_file()
                {
                    *status = match save_csv(&path, &view.table) {
                        Ok(_) => format!("Saved {}", path.display()),
                        Err(err) => format!("Save failed: {err:#}"),
                    };
                }
            }
        });
    ui.add_space(12.0);
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("jp_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .push("jp_fallback".to_string());
            fonts.families
                .entry(FontFamily::Monospace)
                .or_default()
                .push("jp_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_views();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🦜 Bird Conservation Concern Predictor");
                ui.separator();
                ui.label(format!("{} records", self.ctx.table().len()));
                if !self.state.status.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(&self.state.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::SidePanel::left("inputs").resizable(true).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Input Bird Traits");
                ui.separator();
                if self.render_inputs(ui) {
                    self.predict();
                }

                ui.separator();
                let states: Vec<String> = self.ctx.table().state_columns().to_vec();
                multi_select(ui, "State", &states, &mut self.state.states);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_prediction(ui);
            ui.separator();

            let DashboardState { views, status, .. } = &mut self.state;
            egui::ScrollArea::vertical().show(ui, |ui| {
                let (pairs, wide): (Vec<&PanelView>, Vec<&PanelView>) =
                    views.iter().partition(|v| v.panel != Panel::GroupVsIucn);
                for chunk in pairs.chunks(2) {
                    ui.columns(2, |cols| {
                        for (col, view) in cols.iter_mut().zip(chunk) {
                            render_panel(col, view, status);
                        }
                    });
                }
                for view in wide {
                    render_panel(ui, view, status);
                }
            });
        });
    }
}
