//! Overlay walkthrough.
//!
//! Opens popovers and modals against an in-memory document, drives them
//! with clicks and dismissal signals, and prints the stack after each step.
//! Transition details are logged to `overlays.log`.

use std::fs::File;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use lantern::prelude::*;
use lantern::{ManagerConfig, SlotKind};
use simplelog::{Config, LevelFilter, WriteLogger};

fn register_templates(templates: &TemplateRegistry) {
    templates.register("menu", |_| {
        Element::box_().children(vec![
            Element::button("Rename").id("menu-rename").action("rename"),
            Element::button("Delete").id("menu-delete").action("delete"),
        ])
    });

    templates.register("confirm-body", |props| {
        let props = props.clone();
        Element::dynamic(move || format!("Delete {}?", props.display("fileName")))
            .id("confirm-text")
    });

    templates.register("confirm-footer", |props| {
        let props = props.clone();
        Element::box_().children(vec![
            Element::dynamic(move || props.display("footerText")).id("footer-text"),
            Element::button("Delete").id("footer-delete").action("delete"),
            Element::button("Cancel").id("footer-cancel").action("cancel"),
        ])
    });
}

fn print_stack(step: &str, manager: &OverlayManager, document: &Arc<RwLock<Document>>) {
    println!("== {}", step);
    println!("   active modal:  {:?}", manager.active_modal());
    println!("   popovers:      {:?}", manager.open_popovers());
    println!("   listening:     {}", manager.is_listening());
    if let Ok(document) = document.read() {
        if let Some(text) = document.text("footer-text") {
            println!("   footer text:   {:?}", text);
        }
    }
}

#[tokio::main]
async fn main() {
    // Set up file logging
    let log_file = File::create("overlays.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let document = Arc::new(RwLock::new(Document::new()));
    let templates = TemplateRegistry::new();
    register_templates(&templates);

    let manager = OverlayManager::builder(DocumentRenderer::new(document.clone(), templates))
        .animator(TimedAnimator::fade(Duration::from_millis(120)))
        .config(ManagerConfig::new().transition_timeout(Duration::from_millis(500)))
        .build();

    let file_name = Binding::new("notes.txt");

    // Popover menu
    let menu = manager
        .open(
            OverlayDescriptor::popover()
                .content(ContentProvider::template("menu"))
                .action("rename", |cx| {
                    log::info!("rename requested from {}", cx.overlay_id());
                    let _ = cx.close();
                }),
        )
        .expect("menu descriptor is valid");
    tokio::time::sleep(Duration::from_millis(200)).await;
    print_stack("menu open", &manager, &document);

    // Confirmation modal, footer updated by its own action
    let confirm = manager
        .open(
            OverlayDescriptor::modal()
                .content(ContentProvider::template("confirm-body"))
                .slot(
                    Slot::footer(ContentProvider::template("confirm-footer")).action(
                        "delete",
                        |cx| {
                            cx.set("footerText", "Deleting...");
                            log::info!("delete confirmed in {:?}", cx.slot());
                        },
                    ),
                )
                .bind("fileName", file_name.clone())
                .property("footerText", Value::Null),
        )
        .expect("confirm descriptor is valid");
    tokio::time::sleep(Duration::from_millis(200)).await;
    print_stack("confirm open", &manager, &document);

    let click = document
        .read()
        .ok()
        .and_then(|document| document.click("footer-delete"));
    if let Some(click) = click {
        let outcome = manager.dispatch_event(&click);
        println!(
            "   delete handled by: {:?}",
            outcome.scope_of("delete").map(ToString::to_string)
        );
    }
    print_stack("delete clicked", &manager, &document);

    // Escape dismisses the modal, an outside click the menu
    manager.dispatch_event(&Event::key(Key::Escape));
    manager.dispatch_event(&Event::click_nowhere());
    tokio::time::sleep(Duration::from_millis(300)).await;
    print_stack("dismissed", &manager, &document);

    println!("   menu:    {}", menu.state());
    println!("   confirm: {}", confirm.state());
    if let Err(e) = confirm.close() {
        println!("   closing again: {}", e);
    }

    // Two popovers, hidden by a custom signal
    let first = manager
        .open(OverlayDescriptor::popover().content(ContentProvider::template("menu")))
        .expect("valid");
    let second = manager
        .open(
            OverlayDescriptor::popover()
                .content(ContentProvider::template("menu"))
                .slot(Slot::new(
                    SlotKind::Named("hint".into()),
                    ContentProvider::template("missing-template"),
                )),
        )
        .expect("valid");
    tokio::time::sleep(Duration::from_millis(200)).await;
    print_stack("two popovers", &manager, &document);

    manager.hub().hide_popovers();
    tokio::time::sleep(Duration::from_millis(300)).await;
    print_stack("popovers hidden", &manager, &document);
    println!("   first: {}, second: {}", first.state(), second.state());
}
