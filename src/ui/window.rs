use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::Align;
use libadwaita::prelude::*;

use bark_translator::app::{AppEvent, PointerHold, SessionState};

const MIC_ICON: &str = "audio-input-microphone-symbolic";
const STOP_ICON: &str = "media-playback-stop-symbolic";

/// Handles returned from building the translator window.
pub struct TranslatorWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub record_button: gtk4::Button,
    pub caption_label: gtk4::Label,
    pub stop_button: gtk4::Button,
    pub analysis_card: gtk4::Box,
    pub spinner: gtk4::Spinner,
    pub status_label: gtk4::Label,
    pub result_card: gtk4::Box,
    pub personality_badge: gtk4::Label,
    pub translation_label: gtk4::Label,
}

fn card() -> gtk4::Box {
    let card = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    card.add_css_class("card");
    card.set_margin_top(12);
    card.set_margin_start(4);
    card.set_margin_end(4);
    card
}

fn padded(child: &gtk4::Box) {
    child.set_margin_top(16);
    child.set_margin_bottom(16);
    child.set_margin_start(16);
    child.set_margin_end(16);
}

/// Build the main window. Every input is posted to `sender`.
pub fn build_window(
    app: &libadwaita::Application,
    sender: async_channel::Sender<AppEvent>,
) -> TranslatorWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("BarkGPT")
        .default_width(420)
        .default_height(620)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Title ---
    let title = gtk4::Label::new(Some("\u{1F436} BarkGPT"));
    title.add_css_class("title-1");
    let tagline = gtk4::Label::new(Some("The world's most accurate* dog translator"));
    tagline.add_css_class("dim-label");
    let disclaimer = gtk4::Label::new(Some("*100% scientifically inaccurate"));
    disclaimer.add_css_class("caption");
    disclaimer.add_css_class("dim-label");
    content.append(&title);
    content.append(&tagline);
    content.append(&disclaimer);

    // --- Recording card ---
    let record_card = card();
    let record_inner = gtk4::Box::new(gtk4::Orientation::Vertical, 10);
    padded(&record_inner);

    let heading = gtk4::Label::new(Some("Ready to Translate?"));
    heading.add_css_class("title-3");
    record_inner.append(&heading);

    let record_button = gtk4::Button::builder()
        .icon_name(MIC_ICON)
        .width_request(96)
        .height_request(96)
        .halign(Align::Center)
        .build();
    record_button.add_css_class("circular");
    record_button.add_css_class("suggested-action");
    record_inner.append(&record_button);

    let caption_label = gtk4::Label::new(None);
    caption_label.add_css_class("dim-label");
    record_inner.append(&caption_label);

    let stop_button = gtk4::Button::builder()
        .label("Stop Recording")
        .halign(Align::Center)
        .visible(false)
        .build();
    record_inner.append(&stop_button);

    record_card.append(&record_inner);
    content.append(&record_card);

    // --- Analysis card ---
    let analysis_card = card();
    analysis_card.set_visible(false);
    let analysis_inner = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    padded(&analysis_inner);
    let spinner = gtk4::Spinner::new();
    spinner.set_size_request(32, 32);
    let status_label = gtk4::Label::new(None);
    analysis_inner.append(&spinner);
    analysis_inner.append(&status_label);
    analysis_card.append(&analysis_inner);
    content.append(&analysis_card);

    // --- Result card ---
    let result_card = card();
    result_card.set_visible(false);
    let result_inner = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    padded(&result_inner);

    let result_header = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    let result_title = gtk4::Label::new(Some("Translation Result"));
    result_title.add_css_class("title-3");
    result_title.set_hexpand(true);
    result_title.set_xalign(0.0);
    let personality_badge = gtk4::Label::new(None);
    personality_badge.add_css_class("caption-heading");
    personality_badge.add_css_class("accent");
    result_header.append(&result_title);
    result_header.append(&personality_badge);
    result_inner.append(&result_header);

    let translation_label = gtk4::Label::new(None);
    translation_label.set_wrap(true);
    translation_label.set_justify(gtk4::Justification::Center);
    translation_label.set_selectable(true);
    translation_label.add_css_class("title-4");
    result_inner.append(&translation_label);

    let actions = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    actions.set_halign(Align::Center);
    let speak_button = gtk4::Button::builder()
        .icon_name("audio-volume-high-symbolic")
        .tooltip_text("Speak")
        .build();
    let new_button = gtk4::Button::builder()
        .label("New Translation")
        .build();
    actions.append(&speak_button);
    actions.append(&new_button);
    result_inner.append(&actions);
    result_card.append(&result_inner);
    content.append(&result_card);

    // --- Footer ---
    let footer = gtk4::Label::new(Some(
        "No actual dogs were harmed in the making of this translation.\n\
         Results may vary. Side effects include excessive laughter.",
    ));
    footer.set_justify(gtk4::Justification::Center);
    footer.add_css_class("caption");
    footer.add_css_class("dim-label");
    footer.set_margin_top(16);
    content.append(&footer);

    // Pointer gestures on the record button. A drag gesture ends on release no
    // matter how far the pointer moved. Claiming the sequence keeps the button's
    // own gesture out of it, so the order is always press, release, click.
    // Keyboard activation still arrives through `clicked`.
    let drag = gtk4::GestureDrag::new();
    drag.set_propagation_phase(gtk4::PropagationPhase::Capture);
    let hold = Rc::new(RefCell::new(PointerHold::new()));
    {
        let tx = sender.clone();
        let hold = hold.clone();
        drag.connect_drag_begin(move |gesture, _, _| {
            gesture.set_state(gtk4::EventSequenceState::Claimed);
            for event in hold.borrow_mut().press() {
                let _ = tx.try_send(event);
            }
        });
    }
    {
        let tx = sender.clone();
        drag.connect_drag_end(move |_, _, _| {
            for event in hold.borrow_mut().release() {
                let _ = tx.try_send(event);
            }
        });
    }
    record_button.add_controller(drag);

    for (button, event) in [
        (&record_button, AppEvent::Click),
        (&stop_button, AppEvent::StopClicked),
        (&speak_button, AppEvent::SpeakClicked),
        (&new_button, AppEvent::GenerateNew),
    ] {
        let tx = sender.clone();
        button.connect_clicked(move |_| {
            let _ = tx.try_send(event);
        });
    }

    {
        let tx = sender;
        window.connect_close_request(move |_| {
            let _ = tx.try_send(AppEvent::Shutdown);
            gtk4::glib::Propagation::Proceed
        });
    }

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));

    TranslatorWidgets {
        window,
        record_button,
        caption_label,
        stop_button,
        analysis_card,
        spinner,
        status_label,
        result_card,
        personality_badge,
        translation_label,
    }
}

/// Bring every widget in line with the session state.
pub fn render(widgets: &TranslatorWidgets, state: &SessionState) {
    let recording = state.is_recording();
    let analyzing = state.is_analyzing();

    widgets
        .record_button
        .set_icon_name(if recording { STOP_ICON } else { MIC_ICON });
    if recording {
        widgets.record_button.remove_css_class("suggested-action");
        widgets.record_button.add_css_class("destructive-action");
    } else {
        widgets.record_button.remove_css_class("destructive-action");
        widgets.record_button.add_css_class("suggested-action");
    }
    widgets.record_button.set_sensitive(!analyzing);
    widgets.caption_label.set_text(&state.recording_caption());
    widgets.stop_button.set_visible(recording);

    widgets.analysis_card.set_visible(analyzing);
    widgets.spinner.set_spinning(analyzing);
    widgets.status_label.set_text(state.status_message());

    match state.translation() {
        Some(text) if !analyzing => {
            widgets.result_card.set_visible(true);
            widgets
                .translation_label
                .set_text(&format!("\u{201C}{text}\u{201D}"));
            let personality = state.personality().unwrap_or_default();
            widgets.personality_badge.set_text(personality);
            widgets.personality_badge.set_visible(!personality.is_empty());
        }
        _ => widgets.result_card.set_visible(false),
    }
}
