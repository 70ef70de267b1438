//! Fixed names the engine and its data layout reserve.

/// Archive entry name marking animation data. Archives carrying this entry
/// are the ones toggled off to force a full asset recompile.
pub const ANIMS_ENTRY: &str = "ANIMS";

/// Compiled menu data. A rewrite of this file signals that the engine has
/// finished regenerating asset databases and is moving on to the menu.
pub const MENU_DAT: &str = "MENU.DAT";

/// Compiled music database, checked before passing `-znomusic`.
pub const MUSIC_DAT: &str = "MUSIC.DAT";

/// Compiled sound-effects database, checked before passing `-znosound`.
pub const SFX_DAT: &str = "SFX.DAT";

/// World container shipped with every installation.
pub const WORLDS_ARCHIVE: &str = "Worlds.vdf";

/// Additional world container shipped with the addon-enabled engine.
pub const WORLDS_ADDON_ARCHIVE: &str = "Worlds_Addon.vdf";

/// Script source extension.
pub const SCRIPT_EXT: &str = "d";

/// Include-file extension.
pub const INCLUDE_EXT: &str = "src";

/// World file extension.
pub const WORLD_EXT: &str = "zen";

/// Archive extension.
pub const ARCHIVE_EXT: &str = "vdf";

/// Extension given to archives while they are toggled off.
pub const DISABLED_EXT: &str = "disabled";

/// Dialogue output-units file regenerated from `AI_Output` script lines.
pub const OU_FILE: &str = "OU.csl";

/// On-disk journal of toggled-off archives, kept in the data directory so an
/// interrupted run can be recovered.
pub const TOGGLE_JOURNAL: &str = ".modforge-disabled";
