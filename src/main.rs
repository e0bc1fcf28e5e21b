//! Appendix Tree - collapsible rule appendix viewer
//! Built with egui for native Wayland support

use appendix_tree::pipeline::RETRY_HINT;
use appendix_tree::{
    source_for_root, Catalog, DetailEvent, DetailPanel, DocumentSource, LoadPipeline,
    TreeRenderer, TreeViewer, ViewerConfig, ALL_CATEGORIES,
};
use eframe::egui::{self, RichText};
use std::sync::Arc;
use std::time::Duration;

/// Width of the catalog sidebar
const CATALOG_WIDTH: f32 = 260.0;
/// Width of the detail panel
const DETAIL_WIDTH: f32 = 320.0;
/// Poll interval while a load is in flight
const LOAD_POLL: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::load();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let source: Arc<dyn DocumentSource> = Arc::from(source_for_root(&config.data_root));
    let (catalog, startup_error) =
        match runtime.block_on(Catalog::load(source.as_ref(), &config.manifest)) {
            Ok(catalog) => (catalog, None),
            Err(e) => {
                log::error!("Failed to load catalog: {}", e);
                (Catalog::default(), Some(format!("Failed to load catalog: {}", e)))
            }
        };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 900.0])
            .with_min_inner_size([480.0, 400.0])
            .with_title("Appendix Tree"),
        ..Default::default()
    };

    eframe::run_native(
        "Appendix Tree",
        options,
        Box::new(move |_cc| {
            let pipeline = LoadPipeline::new(runtime.handle().clone(), source);
            let mut app = AppendixTree::new(runtime, config, catalog, pipeline);
            if let Some(message) = startup_error {
                app.renderer.show_error(message);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}

struct AppendixTree {
    /// Keeps background loads alive
    _runtime: tokio::runtime::Runtime,
    catalog: Catalog,
    pipeline: LoadPipeline,
    renderer: TreeRenderer,
    viewer: TreeViewer,
    detail: DetailPanel,
    selected_id: Option<String>,
    search: String,
    /// Reset button appears once a leaf has been opened
    reset_visible: bool,
}

impl AppendixTree {
    fn new(
        runtime: tokio::runtime::Runtime,
        config: ViewerConfig,
        catalog: Catalog,
        pipeline: LoadPipeline,
    ) -> Self {
        let mut app = Self {
            _runtime: runtime,
            renderer: TreeRenderer::new(config.layout),
            viewer: TreeViewer::new(),
            detail: DetailPanel::default(),
            selected_id: None,
            search: String::new(),
            reset_visible: false,
            catalog,
            pipeline,
        };

        if let Some(first) = app.catalog.first().map(|e| e.id.clone()) {
            app.select(&first);
        }
        app
    }

    fn select(&mut self, id: &str) {
        match self.catalog.select(id) {
            Some(selection) => {
                self.selected_id = Some(id.to_string());
                self.reset_visible = false;
                self.pipeline.request(&mut self.renderer, selection);
            }
            None => self.renderer.show_error(format!(
                "Invalid appendix config: {} has no configuration\n{}",
                id, RETRY_HINT
            )),
        }
    }

    fn drain_detail_events(&mut self) {
        for event in self.renderer.drain_detail_events() {
            if matches!(event, DetailEvent::Show(_)) {
                self.reset_visible = true;
            }
            self.detail.apply(event);
        }
    }

    fn show_catalog(&mut self, ui: &mut egui::Ui) {
        ui.heading("Appendices");
        ui.add_space(8.0);

        if ui
            .add(egui::TextEdit::singleline(&mut self.search).hint_text("Search..."))
            .changed()
        {
            self.catalog.search(&self.search);
        }

        let mut category = self.catalog.category().to_string();
        egui::ComboBox::from_id_salt("category_filter")
            .selected_text(&category)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut category, ALL_CATEGORIES.to_string(), ALL_CATEGORIES);
                for c in self.catalog.categories() {
                    ui.selectable_value(&mut category, c.clone(), c);
                }
            });
        if category != self.catalog.category() {
            self.catalog.filter_by_category(&category);
        }

        ui.separator();

        let mut picked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for entry in self.catalog.visible() {
                let selected = self.selected_id.as_deref() == Some(entry.id.as_str());
                if ui.selectable_label(selected, &entry.name).clicked() {
                    picked = Some(entry.id.clone());
                }
            }
        });
        if let Some(id) = picked {
            self.select(&id);
        }
    }

    fn show_detail(&mut self, ui: &mut egui::Ui) {
        let Some(detail) = self.detail.content() else {
            return;
        };

        ui.heading(detail.title());
        if let Some(description) = &detail.description {
            ui.label(description);
        }
        if let Some(requirements) = detail.requirements.as_ref().filter(|r| !r.is_empty()) {
            ui.add_space(8.0);
            ui.label(RichText::new("Requirements:").strong());
            for requirement in requirements {
                ui.label(format!("• {}", requirement));
            }
        }

        ui.add_space(12.0);
        if ui.button("Close").clicked() {
            self.renderer.dismiss_detail();
        }
    }
}

impl eframe::App for AppendixTree {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Finished background loads
        self.pipeline.poll(&mut self.renderer);
        self.drain_detail_events();
        if self.renderer.is_loading() {
            ctx.request_repaint_after(LOAD_POLL);
        }

        egui::SidePanel::left("catalog")
            .default_width(CATALOG_WIDTH)
            .resizable(true)
            .show(ctx, |ui| self.show_catalog(ui));

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&self.renderer.tree().name).strong());
                if self.renderer.is_loading() {
                    ui.spinner();
                }
                if self.reset_visible && ui.button("Reset View").clicked() {
                    self.renderer.reset_view(false);
                }
            });
        });

        if self.detail.is_visible() {
            egui::SidePanel::right("details")
                .default_width(DETAIL_WIDTH)
                .show(ctx, |ui| self.show_detail(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.ui(ui, &mut self.renderer);
        });

        self.drain_detail_events();
    }
}
