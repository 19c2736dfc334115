/// Deepest indentation the tree writer emits; deeper levels reuse it.
pub const MAX_INDENT: usize = 32;

/// Installed location of the filesystem resize helper.
pub const LVRESIZE_FS_HELPER_PATH: &str = "/usr/libexec/lvresize_fs_helper";

/// Upper bound on helper arguments, program name excluded.
pub const FS_CMD_MAX_ARGS: usize = 16;
