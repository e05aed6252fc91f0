//! Concrete resource kinds a step resolves to

pub mod command;
pub mod directory;
pub mod file;
pub mod kernel_module;
pub mod package;

pub use command::ShellCommand;
pub use directory::Directory;
pub use file::ManagedFile;
pub use kernel_module::KernelModule;
pub use package::Package;

/// Format permission bits the way `chmod` takes them
pub fn format_mode(mode: u32) -> String {
    format!("{:04o}", mode & 0o7777)
}

#[cfg(test)]
mod tests {
    use super::format_mode;

    #[test]
    fn test_format_mode() {
        assert_eq!(format_mode(0o744), "0744");
        assert_eq!(format_mode(0o100444), "0444");
    }
}
