//! Argument vectors for the external filesystem resize helper.
//!
//! Probing the filesystem, the crypt layer and the mount table happens
//! elsewhere; this module only turns the resulting [`FsInfo`] into the
//! helper's command line.

use std::process::Command;

use smallvec::SmallVec;

use crate::constants::{FS_CMD_MAX_ARGS, LVRESIZE_FS_HELPER_PATH};

/// What is known about the filesystem on a logical volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsInfo {
    pub fstype: String,
    /// Device holding the filesystem: the LV itself, or the crypt device on top of it.
    pub fs_dev_path: String,
    pub needs_crypt: bool,
    /// Minor number of the dm-crypt device, meaningful when `needs_crypt`.
    pub crypt_minor: u32,
    pub crypt_offset_bytes: u64,
    pub mounted: bool,
    pub mount_dir: String,
    pub needs_unmount: bool,
    pub needs_mount: bool,
    pub needs_fsck: bool,
}

impl FsInfo {
    pub fn crypt_path(&self) -> String {
        format!("/dev/dm-{}", self.crypt_minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsMode {
    /// Remount after resizing when the filesystem had to be unmounted.
    Manage,
    #[default]
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperAction {
    Reduce,
    Extend,
    CryptResize,
}

impl HelperAction {
    pub fn flag(self) -> &'static str {
        match self {
            HelperAction::Reduce => "--fsreduce",
            HelperAction::Extend => "--fsextend",
            HelperAction::CryptResize => "--cryptresize",
        }
    }
}

pub fn lv_path(dev_dir: &str, vg_name: &str, lv_name: &str) -> String {
    format!("{dev_dir}{vg_name}/{lv_name}")
}

type ArgList = SmallVec<[String; FS_CMD_MAX_ARGS]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    program: String,
    action: HelperAction,
    args: ArgList,
}

impl HelperCommand {
    pub fn crypt_resize(fsi: &FsInfo, newsize_bytes: u64) -> Self {
        let mut args = ArgList::new();
        push(&mut args, HelperAction::CryptResize.flag());
        push(&mut args, "--cryptpath");
        args.push(fsi.crypt_path());
        push(&mut args, "--newsizebytes");
        args.push(newsize_bytes.to_string());
        Self::finish(HelperAction::CryptResize, args)
    }

    /// `newsize_bytes` of zero leaves the target size to the helper.
    pub fn fs_reduce(lv_path: &str, fsi: &FsInfo, newsize_bytes: u64, mode: FsMode) -> Self {
        Self::fs_resize(HelperAction::Reduce, lv_path, fsi, Some(newsize_bytes), mode)
    }

    pub fn fs_extend(lv_path: &str, fsi: &FsInfo, mode: FsMode) -> Self {
        Self::fs_resize(HelperAction::Extend, lv_path, fsi, None, mode)
    }

    fn fs_resize(
        action: HelperAction,
        lv_path: &str,
        fsi: &FsInfo,
        newsize_bytes: Option<u64>,
        mode: FsMode,
    ) -> Self {
        let mut args = ArgList::new();
        push(&mut args, action.flag());
        push(&mut args, "--fstype");
        push(&mut args, &fsi.fstype);
        push(&mut args, "--lvpath");
        push(&mut args, lv_path);

        if let Some(size) = newsize_bytes.filter(|size| *size > 0) {
            push(&mut args, "--newsizebytes");
            args.push(size.to_string());
        }
        if fsi.mounted {
            push(&mut args, "--mountdir");
            push(&mut args, &fsi.mount_dir);
        }
        if fsi.needs_unmount {
            push(&mut args, "--unmount");
        }
        if fsi.needs_mount {
            push(&mut args, "--mount");
        }
        if fsi.needs_fsck {
            push(&mut args, "--fsck");
        }
        if fsi.needs_crypt {
            push(&mut args, HelperAction::CryptResize.flag());
            push(&mut args, "--cryptpath");
            args.push(fsi.crypt_path());
        }
        if fsi.needs_unmount && mode == FsMode::Manage {
            push(&mut args, "--remount");
        }

        Self::finish(action, args)
    }

    fn finish(action: HelperAction, args: ArgList) -> Self {
        tracing::debug!(action = action.flag(), args = ?args, "helper command prepared");
        Self {
            program: LVRESIZE_FS_HELPER_PATH.to_string(),
            action,
            args,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn action(&self) -> HelperAction {
        self.action
    }

    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args())
            .collect()
    }

    /// An unstarted [`Command`] for the helper.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.args.iter());
        command
    }
}

fn push(args: &mut ArgList, arg: &str) {
    args.push(arg.to_string());
}
