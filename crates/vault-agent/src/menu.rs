use extensions_bridge::PageCommand;
use serde::{Deserialize, Serialize};

/// Context menu items offered on editable elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuItem {
    GeneratePassword,
    FillCredentials,
}

impl MenuItem {
    pub fn id(&self) -> &'static str {
        match self {
            MenuItem::GeneratePassword => "generatePassword",
            MenuItem::FillCredentials => "fillCredentials",
        }
    }

    pub fn command(&self, target_element_id: Option<String>) -> PageCommand {
        match self {
            MenuItem::GeneratePassword => PageCommand::GeneratePassword { target_element_id },
            MenuItem::FillCredentials => PageCommand::FillCredentials { target_element_id },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: &'static str,
    pub parent: Option<&'static str>,
    pub title: &'static str,
    pub editable_only: bool,
}

pub const MENU_ROOT: &str = "keyfill";

/// Menu tree registered with the host browser.
pub fn context_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry {
            id: MENU_ROOT,
            parent: None,
            title: "Keyfill",
            editable_only: false,
        },
        MenuEntry {
            id: MenuItem::GeneratePassword.id(),
            parent: Some(MENU_ROOT),
            title: "Generate Password",
            editable_only: true,
        },
        MenuEntry {
            id: MenuItem::FillCredentials.id(),
            parent: Some(MENU_ROOT),
            title: "Fill Credentials",
            editable_only: true,
        },
    ]
}
