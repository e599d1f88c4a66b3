use gtk::prelude::*;

use memory::LeakReport;
use report::Summary;
use vitals::{Grade, VitalsGrades, VitalsMetrics};

const MEASURING: &str = "measuring…";

/// Native HUD panel showing the latest monitor snapshot.
///
/// The panel is read-only: the poll loop hands it fresh snapshots and it
/// never touches the trackers.
#[derive(Clone)]
pub struct Hud {
    root: gtk::Box,
    score: gtk::Label,
    fps: gtk::Label,
    render: gtk::Label,
    memory: gtk::Label,
    interactions: gtk::Label,
    fcp: gtk::Label,
    lcp: gtk::Label,
    cls: gtk::Label,
    fid: gtk::Label,
    leak: gtk::Label,
}

impl Hud {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.set_margin_top(16);
        root.set_margin_bottom(16);
        root.set_margin_start(16);
        root.set_margin_end(16);

        let score = gtk::Label::new(Some("–"));
        score.add_css_class("title-1");
        root.append(&score);

        let score_caption = gtk::Label::new(Some("performance score"));
        score_caption.add_css_class("dim-label");
        root.append(&score_caption);

        let grid = gtk::Grid::new();
        grid.set_row_spacing(6);
        grid.set_column_spacing(12);
        root.append(&grid);

        let fps = attach_row(&grid, 0, "Frame rate");
        let render = attach_row(&grid, 1, "Avg render");
        let memory = attach_row(&grid, 2, "Memory");
        let interactions = attach_row(&grid, 3, "Interactions");
        let fcp = attach_row(&grid, 4, "FCP");
        let lcp = attach_row(&grid, 5, "LCP");
        let cls = attach_row(&grid, 6, "CLS");
        let fid = attach_row(&grid, 7, "FID");
        let leak = attach_row(&grid, 8, "Heap trend");

        Self {
            root,
            score,
            fps,
            render,
            memory,
            interactions,
            fcp,
            lcp,
            cls,
            fid,
            leak,
        }
    }

    pub fn root(&self) -> &gtk::Box {
        &self.root
    }

    pub fn update(
        &self,
        summary: &Summary,
        metrics: &VitalsMetrics,
        grades: &VitalsGrades,
        leak: &LeakReport,
    ) {
        self.score.set_text(&summary.score.to_string());
        self.fps.set_text(&format!("{:.0} fps", summary.current_fps));
        self.render
            .set_text(&format!("{:.1} ms", summary.average_render_ms));
        self.memory
            .set_text(&format!("{:.1} MB", summary.memory_used_mb));
        self.interactions
            .set_text(&summary.interaction_count.to_string());

        set_vital(
            &self.fcp,
            metrics.fcp_ms.map(|v| format!("{v:.0} ms")),
            grades.fcp,
        );
        set_vital(
            &self.lcp,
            metrics.lcp_ms.map(|v| format!("{v:.0} ms")),
            grades.lcp,
        );
        set_vital(&self.cls, metrics.cls.map(|v| format!("{v:.3}")), grades.cls);
        set_vital(
            &self.fid,
            metrics.fid_ms.map(|v| format!("{v:.0} ms")),
            grades.fid,
        );

        if leak.has_leak {
            self.leak.set_text(&format!(
                "possible leak: {:.0}% growth (confidence {:.2})",
                leak.growth_ratio * 100.0,
                leak.confidence
            ));
            self.leak.add_css_class("error");
        } else {
            self.leak.set_text("stable");
            self.leak.remove_css_class("error");
        }
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

fn attach_row(grid: &gtk::Grid, row: i32, caption: &str) -> gtk::Label {
    let name = gtk::Label::new(Some(caption));
    name.set_halign(gtk::Align::Start);
    name.add_css_class("dim-label");
    grid.attach(&name, 0, row, 1, 1);

    let value = gtk::Label::new(Some(MEASURING));
    value.set_halign(gtk::Align::Start);
    grid.attach(&value, 1, row, 1, 1);
    value
}

fn set_vital(label: &gtk::Label, value: Option<String>, grade: Option<Grade>) {
    match (value, grade) {
        (Some(value), Some(grade)) => label.set_text(&format!("{value} ({grade})")),
        _ => label.set_text(MEASURING),
    }
}
