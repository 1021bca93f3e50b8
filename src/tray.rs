//! System tray front-end
//!
//! Shows a tray icon with "Type to LinWisp", "Record to LinWisp" and "Quit".
//! Each activation runs one request cycle through dialogs, inside the event
//! loop, so a second request cannot start while one is running.

use crate::app::{self, Options, RunStatus, Services, TrayAction};
use anyhow::Context;
use pidlock::Pidlock;
use std::time::{Duration, Instant};
use tao::event_loop::{ControlFlow, EventLoop};
use tao::platform::run_return::EventLoopExtRunReturn;
use tray_icon::{
    menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    Icon, TrayIconBuilder,
};

/// Menu item IDs
mod menu_ids {
    pub const TYPE: &str = "type";
    pub const RECORD: &str = "record";
    pub const QUIT: &str = "quit";
}

const ICON_SIZE: u32 = 32;

/// Map a menu item ID to what it asks for
fn action_for(id: &str) -> Option<MenuChoice> {
    match id {
        menu_ids::TYPE => Some(MenuChoice::Cycle(TrayAction::Type)),
        menu_ids::RECORD => Some(MenuChoice::Cycle(TrayAction::Record)),
        menu_ids::QUIT => Some(MenuChoice::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Cycle(TrayAction),
    Quit,
}

fn build_menu() -> anyhow::Result<Menu> {
    let menu = Menu::new();
    let type_item = MenuItem::with_id(menu_ids::TYPE, "Type to LinWisp", true, None);
    let record_item = MenuItem::with_id(menu_ids::RECORD, "Record to LinWisp", true, None);
    let quit_item = MenuItem::with_id(menu_ids::QUIT, "Quit", true, None);

    menu.append(&type_item)?;
    menu.append(&record_item)?;
    menu.append(&PredefinedMenuItem::separator())?;
    menu.append(&quit_item)?;
    Ok(menu)
}

/// A speech bubble: filled circle with a small tail, transparent elsewhere
fn icon_rgba(size: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    let center = size as f32 / 2.0;
    let radius = size as f32 * 0.4;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - (center - 2.0);
            let in_bubble = dx * dx + dy * dy <= radius * radius;
            // Tail below the bubble, on the left
            let ty = y as f32 - (center + radius - 4.0);
            let tx = x as f32 - (center - 8.0);
            let in_tail = (0.0..6.0).contains(&ty) && tx >= 0.0 && tx < 6.0 - ty;

            if in_bubble || in_tail {
                rgba.extend_from_slice(&[0x3d, 0x8b, 0xfd, 0xff]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    rgba
}

/// Run the tray until "Quit" or a fatal error
///
/// Must be called from the main thread.
pub fn run(options: &Options, services: &mut Services) -> anyhow::Result<RunStatus> {
    // Single instance check
    std::fs::create_dir_all(&services.paths.runtime_dir).with_context(|| {
        format!(
            "Failed to create runtime directory {}",
            services.paths.runtime_dir.display()
        )
    })?;
    let lock_path = services.paths.runtime_dir.join("tray.lock");
    let lock_path_str = lock_path.to_string_lossy().to_string();
    let mut pidlock = Pidlock::new(&lock_path_str);

    if pidlock.acquire().is_err() {
        anyhow::bail!("Another LinWisp tray is already running.");
    }
    tracing::debug!("Acquired tray lock {}", lock_path.display());

    // The event loop must exist before the tray icon on Linux (it initializes GTK)
    let mut event_loop = EventLoop::new();

    let icon = Icon::from_rgba(icon_rgba(ICON_SIZE), ICON_SIZE, ICON_SIZE)
        .context("Failed to build tray icon image")?;
    let _tray = TrayIconBuilder::new()
        .with_tooltip("LinWisp")
        .with_icon(icon)
        .with_menu(Box::new(build_menu()?))
        .build()
        .context("Failed to create tray icon")?;

    tracing::info!("Tray is running");

    let menu_channel = MenuEvent::receiver();

    let code = event_loop.run_return(|_event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(Instant::now() + Duration::from_millis(100));

        // Check for menu events (non-blocking)
        let Ok(event) = menu_channel.try_recv() else {
            return;
        };

        match action_for(event.id().0.as_str()) {
            Some(MenuChoice::Cycle(action)) => {
                tracing::debug!("Tray activation: {:?}", action);
                if app::tray_activation(options, services, action) == RunStatus::Failure {
                    *control_flow = ControlFlow::ExitWithCode(RunStatus::Failure.code());
                }
            }
            Some(MenuChoice::Quit) => {
                tracing::info!("Quit requested from tray");
                *control_flow = ControlFlow::ExitWithCode(RunStatus::Success.code());
            }
            None => {}
        }
    });

    if let Err(e) = pidlock.release() {
        tracing::warn!("Failed to release tray lock: {:?}", e);
    }

    Ok(if code == 0 {
        RunStatus::Success
    } else {
        RunStatus::Failure
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ids_map_to_actions() {
        assert_eq!(action_for("type"), Some(MenuChoice::Cycle(TrayAction::Type)));
        assert_eq!(action_for("record"), Some(MenuChoice::Cycle(TrayAction::Record)));
        assert_eq!(action_for("quit"), Some(MenuChoice::Quit));
        assert_eq!(action_for("other"), None);
    }

    #[test]
    fn test_icon_has_opaque_and_clear_pixels() {
        let rgba = icon_rgba(ICON_SIZE);
        assert_eq!(rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
        let alphas: Vec<u8> = rgba.chunks(4).map(|p| p[3]).collect();
        assert!(alphas.contains(&0xff));
        assert!(alphas.contains(&0));
        // The center pixel is inside the bubble
        let center = ((ICON_SIZE / 2) * ICON_SIZE + ICON_SIZE / 2) as usize;
        assert_eq!(alphas[center], 0xff);
    }
}
