//! Theme registry and current-theme selection.
//!
//! DESIGN
//! ======
//! The registry is static: five named themes with palette, font family,
//! and descriptive metadata. Selection is validated against the registry
//! and held in memory only; the service restarts on `light`.

use std::sync::{Mutex, OnceLock, PoisonError};

use serde::Serialize;

pub const DEFAULT_THEME: &str = "light";

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThemeKind {
    Light,
    Dark,
    Colored,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemePalette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
}

/// One entry of the theme registry.
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ThemeKind,
    pub font_family: &'static str,
    pub description: &'static str,
    pub colors: ThemePalette,
}

/// The static theme registry.
#[must_use]
pub fn registry() -> &'static [Theme] {
    static REGISTRY: OnceLock<Vec<Theme>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            Theme {
                id: "light",
                name: "Light Theme",
                kind: ThemeKind::Light,
                font_family: "Open Sans, sans-serif",
                description: "Clean and minimal light interface",
                colors: ThemePalette {
                    primary: "#3b82f6",
                    secondary: "#64748b",
                    background: "#ffffff",
                    surface: "#f8fafc",
                },
            },
            Theme {
                id: "dark",
                name: "Dark Theme",
                kind: ThemeKind::Dark,
                font_family: "Times New Roman, serif",
                description: "Elegant dark interface with serif fonts",
                colors: ThemePalette {
                    primary: "#60a5fa",
                    secondary: "#94a3b8",
                    background: "#0f172a",
                    surface: "#1e293b",
                },
            },
            Theme {
                id: "yellow",
                name: "Yellow Theme",
                kind: ThemeKind::Colored,
                font_family: "Arial, sans-serif",
                description: "Warm and energetic color scheme",
                colors: ThemePalette {
                    primary: "#f59e0b",
                    secondary: "#92400e",
                    background: "#fffbeb",
                    surface: "#fef3c7",
                },
            },
            Theme {
                id: "blue",
                name: "Blue Theme",
                kind: ThemeKind::Colored,
                font_family: "Roboto, sans-serif",
                description: "Professional blue interface",
                colors: ThemePalette {
                    primary: "#2563eb",
                    secondary: "#1e40af",
                    background: "#eff6ff",
                    surface: "#dbeafe",
                },
            },
            Theme {
                id: "green",
                name: "Green Theme",
                kind: ThemeKind::Colored,
                font_family: "Inter, sans-serif",
                description: "Natural and calming green theme",
                colors: ThemePalette {
                    primary: "#16a34a",
                    secondary: "#15803d",
                    background: "#f0fdf4",
                    surface: "#dcfce7",
                },
            },
        ]
    })
}

#[must_use]
pub fn lookup(id: &str) -> Option<&'static Theme> {
    registry().iter().find(|t| t.id == id)
}

/// Process-wide current theme.
pub struct ThemeStore {
    current: Mutex<&'static str>,
}

impl ThemeStore {
    #[must_use]
    pub fn new() -> Self {
        Self { current: Mutex::new(DEFAULT_THEME) }
    }

    /// Select a theme by id.
    ///
    /// # Errors
    ///
    /// `UnknownTheme` for ids not in the registry.
    pub fn set_theme(&self, id: &str) -> Result<&'static Theme, ThemeError> {
        let theme = lookup(id).ok_or_else(|| ThemeError::UnknownTheme(id.to_string()))?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = theme.id;
        Ok(theme)
    }

    /// The currently selected theme.
    #[must_use]
    pub fn current(&self) -> &'static Theme {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        // The stored id always comes from the registry.
        lookup(*current).unwrap_or(&registry()[0])
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
