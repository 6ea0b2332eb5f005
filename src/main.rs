use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, Column, Image, Row};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::{FileDialog, MessageDialog, MessageLevel};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use photo_intake::imaging::{Adjuster, ImageCropper};
use photo_intake::intake::{
    selection_from_folder, selection_from_paths, DecodedBatch, SelectedFile,
};
use photo_intake::state::{EditParams, IntakeReport};
use photo_intake::{EncodedImage, IntakeError, PipelineConfig, Session, SlotId};

/// Exposure step for the +/- buttons, in stops
const EXPOSURE_STEP: f32 = 0.33;

/// Size of gallery thumbnails on screen
const THUMB_SIZE: f32 = 141.0;

/// Main application state
struct PhotoIntake {
    /// The intake session (single writer: `update`)
    session: Session,
    cropper: ImageCropper,
    /// What the order line currently holds, kept fresh by the session
    order: Arc<Mutex<Vec<EncodedImage>>>,
    /// Validation report of the batch being decoded; new selections wait for it
    pending: Option<IntakeReport>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Upload Images"
    PickFiles,
    /// User clicked "Upload Folder"
    PickFolder,
    /// Background decode completed
    BatchDecoded(Result<DecodedBatch, IntakeError>),
    /// User confirmed the crop of the active image
    ConfirmCrop,
    /// Exposure +/- on a finished image
    Adjust(SlotId, f32),
    /// Remove an image
    Remove(SlotId),
    /// Hand the images to the order
    Finish,
}

impl PhotoIntake {
    fn new(config: PipelineConfig) -> (Self, Task<Message>) {
        let order = Arc::new(Mutex::new(Vec::new()));

        let mirror = Arc::clone(&order);
        let consumer = move |images: &[EncodedImage]| {
            info!("🛒 Order line now holds {} image(s)", images.len());
            if let Ok(mut order) = mirror.lock() {
                *order = images.to_vec();
            }
        };

        let session = Session::new(&config, consumer);
        let status = format!(
            "Ready. Upload {} image{}.",
            session.capacity(),
            if session.capacity() == 1 { "" } else { "s" }
        );

        (
            PhotoIntake {
                session,
                cropper: ImageCropper::new(),
                order,
                pending: None,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFiles => {
                let picked = FileDialog::new()
                    .set_title("Select Photos")
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"])
                    .pick_files();

                match picked {
                    Some(paths) => self.start_intake(selection_from_paths(paths)),
                    None => Task::none(),
                }
            }
            Message::PickFolder => {
                let folder = FileDialog::new()
                    .set_title("Select Folder with Photos")
                    .pick_folder();

                match folder {
                    Some(folder) => self.start_intake(selection_from_folder(&folder)),
                    None => Task::none(),
                }
            }
            Message::BatchDecoded(result) => {
                let Some(report) = self.pending.take() else {
                    return Task::none();
                };
                match result {
                    Ok(batch) => {
                        let report = self.session.finish_intake(report, batch);
                        self.status = describe_intake(&report);
                    }
                    Err(e) => {
                        error!("Batch failed: {}", e);
                        self.status = format!("Upload failed: {}", e);
                    }
                }
                Task::none()
            }
            Message::ConfirmCrop => {
                match self.session.confirm_crop(&self.cropper, None) {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        self.status = format!(
                            "All images cropped. {} remaining.",
                            self.session.remaining_slots()
                        );
                    }
                    Err(e) => {
                        error!("Crop failed: {}", e);
                        self.status = format!("Crop failed: {}", e);
                    }
                }
                Task::none()
            }
            Message::Adjust(id, stops) => {
                let adjuster = Adjuster::new(EditParams {
                    exposure: stops,
                    ..EditParams::default()
                });
                if let Err(e) = self.session.edit_with(id, &adjuster) {
                    warn!("Edit failed: {}", e);
                    self.status = format!("Edit failed: {}", e);
                }
                Task::none()
            }
            Message::Remove(id) => {
                if let Err(e) = self.session.remove(id) {
                    warn!("Remove failed: {}", e);
                }
                self.status = format!("{} images remaining.", self.session.remaining_slots());
                Task::none()
            }
            Message::Finish => {
                match self.session.handoff() {
                    Ok(images) => {
                        let held = self.order.lock().map(|order| order.len()).unwrap_or(0);
                        info!("✅ Handing off {} image(s) (order line has {})", images.len(), held);
                        self.status = format!("Order ready with {} image(s).", images.len());
                    }
                    Err(e) => alert(&e.to_string()),
                }
                Task::none()
            }
        }
    }

    /// Validate a selection and decode it in the background
    fn start_intake(&mut self, selection: Vec<SelectedFile>) -> Task<Message> {
        if self.pending.is_some() {
            self.status = "Still reading the previous upload...".to_string();
            return Task::none();
        }

        let pending = self.session.begin_intake(selection);
        if let Some(warning) = &pending.report().warning {
            alert(&warning.to_string());
        }
        if pending.is_empty() {
            self.status = "No usable images in that selection.".to_string();
            return Task::none();
        }

        self.status = format!("Reading {} image(s)...", pending.files().len());

        let (decode, report) = pending.into_parts();
        self.pending = Some(report);
        Task::perform(decode, Message::BatchDecoded)
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let mut content: Column<Message> = column![
            text("Photo Intake").size(36),
            text(&self.status).size(16),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        if let Some(slot) = self.session.active_slot() {
            // Initial cropper
            let (current, total) = self.session.crop_progress().unwrap_or((1, 1));
            content = content.push(
                Image::<Handle>::new(handle(&slot.original))
                    .height(Length::Fixed(400.0))
                    .width(Length::Fill),
            );
            content = content.push(
                row![
                    text(format!("Image {} of {}", current, total)).size(14),
                    button("Confirm Crop").on_press(Message::ConfirmCrop).padding(10),
                ]
                .spacing(20)
                .align_y(Alignment::Center),
            );
        } else {
            if self.session.remaining_slots() > 0 && self.pending.is_none() {
                content = content.push(
                    row![
                        button("Upload Images").on_press(Message::PickFiles).padding(10),
                        button("Upload Folder").on_press(Message::PickFolder).padding(10),
                    ]
                    .spacing(10),
                );
                content = content.push(
                    text(format!("{} images remaining", self.session.remaining_slots())).size(12),
                );
            }

            let gallery = Row::with_children(
                self.session
                    .slots()
                    .iter()
                    .filter_map(|slot| slot.finalized.as_ref().map(|image| (slot.id, image)))
                    .map(|(id, image)| gallery_tile(id, image)),
            )
            .spacing(16);
            content = content.push(scrollable(gallery).direction(
                scrollable::Direction::Horizontal(scrollable::Scrollbar::default()),
            ));

            if self.session.finalized_count() > 0 {
                content = content.push(button("Add to Order").on_press(Message::Finish).padding(10));
            }
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// One finished image with its edit and remove controls
fn gallery_tile(id: SlotId, image: &EncodedImage) -> Element<'static, Message> {
    column![
        Image::<Handle>::new(handle(image))
            .width(Length::Fixed(THUMB_SIZE))
            .height(Length::Fixed(THUMB_SIZE)),
        row![
            button("-").on_press(Message::Adjust(id, -EXPOSURE_STEP)),
            button("+").on_press(Message::Adjust(id, EXPOSURE_STEP)),
            button("Remove").on_press(Message::Remove(id)),
        ]
        .spacing(4),
    ]
    .spacing(6)
    .align_x(Alignment::Center)
    .into()
}

/// Status line for a finished intake
fn describe_intake(report: &IntakeReport) -> String {
    let mut status = format!("Added {} image(s).", report.appended.len());
    if report.over_capacity > 0 {
        status.push_str(&format!(" {} over the limit.", report.over_capacity));
    }
    if report.wrong_type > 0 {
        status.push_str(&format!(" {} not images.", report.wrong_type));
    }
    if !report.decode_failures.is_empty() {
        let names: Vec<&str> = report
            .decode_failures
            .iter()
            .map(|e| e.file_name())
            .collect();
        status.push_str(&format!(" Could not read {}.", names.join(", ")));
    }
    status
}

fn handle(image: &EncodedImage) -> Handle {
    Handle::from_bytes(image.bytes().to_vec())
}

/// Modal warning for the user
fn alert(message: &str) {
    warn!("{}", message);
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Photo Intake")
        .set_description(message)
        .show();
}

fn load_config() -> PipelineConfig {
    let loaded = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(Path::new(&path)),
        None => PipelineConfig::load_or_default(),
    };

    loaded.unwrap_or_else(|e| {
        error!("{}; using defaults", e);
        PipelineConfig::default()
    })
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = load_config();
    info!(
        "🎨 Photo Intake starting: {} image(s), {}:{} crop, {}x{} output",
        config.max_images,
        config.max_width,
        config.max_height,
        config.output_width,
        config.output_height
    );

    iced::application("Photo Intake", PhotoIntake::update, PhotoIntake::view)
        .theme(PhotoIntake::theme)
        .centered()
        .run_with(move || PhotoIntake::new(config))
}
