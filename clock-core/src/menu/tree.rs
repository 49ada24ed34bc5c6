//! Menu tree built into the firmware.

use super::MenuNode;
use super::actions::ActionId;

pub static SETTINGS_MENU: [MenuNode; 7] = [
    MenuNode::action("Connect WiFi", ActionId::ConnectWifi),
    MenuNode::action("Disconnect WiFi", ActionId::DisconnectWifi),
    MenuNode::action("Edit connection", ActionId::EditConnection),
    MenuNode::action("Sync time (NTP)", ActionId::SyncTime),
    MenuNode::action("Host WiFi page", ActionId::HostPage),
    MenuNode::action("Load saved time", ActionId::LoadSavedTime),
    MenuNode::action("Reset", ActionId::Reset),
];

pub static ROOT_MENU: [MenuNode; 3] = [
    MenuNode::submenu("Settings", &SETTINGS_MENU),
    MenuNode::action("Set clock", ActionId::SetClock),
    MenuNode::action("Credits", ActionId::Credits),
];
