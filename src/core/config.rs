//! Configuration types and management for symveil.
//!
//! One YAML-serializable configuration tree covers the whole run: the
//! obfuscation surface (vendored directories, manual overrides, generator
//! knobs), the frontend (clang executable, platform, extra compile flags),
//! and output formatting. Keeping the canonical defaults in one place
//! prevents the CLI and library surfaces from drifting apart.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SymveilError};

/// Main configuration for a symveil run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymveilConfig {
    /// Symbol classification and generation settings
    #[serde(default)]
    pub obfuscation: ObfuscationConfig,

    /// Compiler frontend settings
    #[serde(default)]
    pub frontend: FrontendConfig,

    /// Macro emission settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl SymveilConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SymveilError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            SymveilError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Render the default configuration as YAML.
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&Self::default()).map_err(Into::into)
    }

    /// Validate configuration settings.
    pub fn validate(&self) -> Result<()> {
        self.obfuscation.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Symbol classification and identifier generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscationConfig {
    /// Target platform; selects the system-import set that seeds the blacklist
    #[serde(default)]
    pub platform: Platform,

    /// Directory names whose files are never scanned (vendored code)
    #[serde(default = "ObfuscationConfig::default_vendor_dirs")]
    pub vendor_dirs: Vec<String>,

    /// Symbol names never renamed regardless of where they are declared
    #[serde(default)]
    pub blacklist_overrides: Vec<String>,

    /// Class/base names never renamed (Interface-Builder references)
    #[serde(default)]
    pub ui_bound_overrides: Vec<String>,

    /// Resource-file extensions that mark a base name as UI-bound
    #[serde(default = "ObfuscationConfig::default_ui_resource_extensions")]
    pub ui_resource_extensions: Vec<String>,

    /// Number of dictionary words per generated identifier
    #[serde(default = "ObfuscationConfig::default_word_count")]
    pub word_count: usize,

    /// Selector-piece prefix that marks a setter
    #[serde(default = "ObfuscationConfig::default_setter_prefix")]
    pub setter_prefix: String,

    /// Selector-piece prefix preserved on initializer-style methods
    #[serde(default = "ObfuscationConfig::default_initializer_prefix")]
    pub initializer_prefix: String,

    /// Word dictionary file; the embedded dictionary is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_path: Option<PathBuf>,

    /// Generator seed; drawn from system time when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            vendor_dirs: Self::default_vendor_dirs(),
            blacklist_overrides: Vec::new(),
            ui_bound_overrides: Vec::new(),
            ui_resource_extensions: Self::default_ui_resource_extensions(),
            word_count: Self::default_word_count(),
            setter_prefix: Self::default_setter_prefix(),
            initializer_prefix: Self::default_initializer_prefix(),
            dictionary_path: None,
            seed: None,
        }
    }
}

impl ObfuscationConfig {
    fn default_vendor_dirs() -> Vec<String> {
        vec!["Pods".to_string(), "ThirdLibrary".to_string()]
    }

    fn default_ui_resource_extensions() -> Vec<String> {
        vec!["xib".to_string(), "storyboard".to_string()]
    }

    fn default_word_count() -> usize {
        5
    }

    fn default_setter_prefix() -> String {
        "set".to_string()
    }

    fn default_initializer_prefix() -> String {
        "initWith".to_string()
    }

    /// Validate classification settings.
    pub fn validate(&self) -> Result<()> {
        if self.word_count == 0 {
            return Err(SymveilError::config_field(
                "must be at least 1",
                "obfuscation.word_count",
            ));
        }
        if self.setter_prefix.is_empty() {
            return Err(SymveilError::config_field(
                "must not be empty",
                "obfuscation.setter_prefix",
            ));
        }
        if self.initializer_prefix.is_empty() {
            return Err(SymveilError::config_field(
                "must not be empty",
                "obfuscation.initializer_prefix",
            ));
        }
        if self
            .ui_resource_extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.contains('.'))
        {
            return Err(SymveilError::config_field(
                "extensions are bare segments without dots",
                "obfuscation.ui_resource_extensions",
            ));
        }
        if self.vendor_dirs.iter().any(String::is_empty) {
            return Err(SymveilError::config_field(
                "directory names must not be empty",
                "obfuscation.vendor_dirs",
            ));
        }
        Ok(())
    }
}

/// Compiler frontend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Clang executable used to index translation units
    #[serde(default = "FrontendConfig::default_clang_executable")]
    pub clang_executable: PathBuf,

    /// SDK version segment appended to the platform SDK directory name
    #[serde(default)]
    pub sdk_version: String,

    /// Additional compile arguments appended to every indexing invocation
    #[serde(default)]
    pub extra_compile_args: Vec<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            clang_executable: Self::default_clang_executable(),
            sdk_version: String::new(),
            extra_compile_args: Vec::new(),
        }
    }
}

impl FrontendConfig {
    fn default_clang_executable() -> PathBuf {
        PathBuf::from("clang")
    }
}

/// Macro emission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Column width the original name is padded to inside each macro block
    #[serde(default = "OutputConfig::default_padding_width")]
    pub padding_width: usize,

    /// Byte capacity of the output sink; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            padding_width: Self::default_padding_width(),
            max_bytes: None,
        }
    }
}

impl OutputConfig {
    fn default_padding_width() -> usize {
        30
    }

    /// Validate emission settings.
    pub fn validate(&self) -> Result<()> {
        if self.padding_width == 0 {
            return Err(SymveilError::config_field(
                "must be at least 1",
                "output.padding_width",
            ));
        }
        Ok(())
    }
}

/// Apple platform identifiers, named after their SDK directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS device SDK
    #[default]
    IPhoneOs,
    /// iOS simulator SDK
    IPhoneSimulator,
    /// macOS SDK
    MacOsX,
    /// tvOS device SDK
    AppleTvOs,
    /// tvOS simulator SDK
    AppleTvSimulator,
    /// watchOS device SDK
    WatchOs,
    /// watchOS simulator SDK
    WatchSimulator,
}

impl Platform {
    /// SDK directory stem under `Platforms/`.
    pub fn platform_dir(&self) -> &'static str {
        match self {
            Platform::IPhoneOs => "iPhoneOS",
            Platform::IPhoneSimulator => "iPhoneSimulator",
            Platform::MacOsX => "MacOSX",
            Platform::AppleTvOs => "AppleTVOS",
            Platform::AppleTvSimulator => "AppleTVSimulator",
            Platform::WatchOs => "WatchOS",
            Platform::WatchSimulator => "WatchSimulator",
        }
    }

    /// Path of the platform SDK inside the active Xcode installation.
    pub fn sdk_path(&self, version: &str) -> PathBuf {
        let dir = self.platform_dir();
        PathBuf::from(format!(
            "/Applications/Xcode.app/Contents/Developer/Platforms/{dir}.platform/Developer/SDKs/{dir}{version}.sdk"
        ))
    }

    fn min_version_arg(&self) -> &'static str {
        match self {
            Platform::IPhoneOs => "-miphoneos-version-min=8.0",
            Platform::IPhoneSimulator => "-mios-simulator-version-min=8.0",
            Platform::MacOsX => "-mmacosx-version-min=10.12",
            Platform::AppleTvOs => "-mtvos-version-min=9.0",
            Platform::AppleTvSimulator => "-mtvos-simulator-version-min=9.0",
            Platform::WatchOs => "-mwatchos-version-min=2.0",
            Platform::WatchSimulator => "-mwatchos-simulator-version-min=2.0",
        }
    }

    /// Base compile arguments for indexing translation units on this platform.
    pub fn base_compile_args(&self, sdk_version: &str) -> Vec<String> {
        let sdk = self.sdk_path(sdk_version);
        vec![
            "-x".to_string(),
            "objective-c".to_string(),
            "-fobjc-arc".to_string(),
            self.min_version_arg().to_string(),
            "-isysroot".to_string(),
            sdk.display().to_string(),
            format!("-I{}", sdk.join("usr/include").display()),
        ]
    }

    /// Synthetic translation unit importing every system framework the
    /// target project may use. Every symbol it declares seeds the blacklist.
    pub fn system_import_source(&self) -> String {
        let mut source = String::from(POSIX_IMPORTS);
        match self {
            Platform::MacOsX => source.push_str(MACOS_FRAMEWORK_IMPORTS),
            _ => source.push_str(UIKIT_FRAMEWORK_IMPORTS),
        }
        source
    }
}

const POSIX_IMPORTS: &str = "\
#import <Foundation/Foundation.h>
#import <CoreFoundation/CoreFoundation.h>
#import <CoreGraphics/CoreGraphics.h>
#import <Security/Security.h>
#import <Security/SecureTransport.h>
#import <SystemConfiguration/SystemConfiguration.h>
#import <objc/runtime.h>
#import <objc/message.h>
#import <dispatch/dispatch.h>
#import <Availability.h>
#import <TargetConditionals.h>
#include <CommonCrypto/CommonCrypto.h>
#import <tgmath.h>
#import <arpa/inet.h>
#import <fcntl.h>
#import <ifaddrs.h>
#import <netdb.h>
#import <netinet/in.h>
#import <net/if.h>
#include <net/if_dl.h>
#import <sys/socket.h>
#import <sys/sysctl.h>
#import <sys/types.h>
#import <sys/ioctl.h>
#import <sys/poll.h>
#import <sys/uio.h>
#import <sys/un.h>
#import <sys/utsname.h>
#import <mach/mach.h>
#import <dlfcn.h>
#import <unistd.h>
#import <sqlite3.h>
";

const UIKIT_FRAMEWORK_IMPORTS: &str = "\
#import <UIKit/UIKit.h>
#import <WebKit/WebKit.h>
#import <CoreMotion/CoreMotion.h>
#import <AVFoundation/AVFoundation.h>
#import <CFNetwork/CFNetwork.h>
#import <CoreTelephony/CTTelephonyNetworkInfo.h>
#import <CoreTelephony/CTCarrier.h>
#import <CoreTelephony/CTCallCenter.h>
#import <SystemConfiguration/CaptiveNetwork.h>
";

const MACOS_FRAMEWORK_IMPORTS: &str = "\
#import <AppKit/AppKit.h>
#import <WebKit/WebKit.h>
#import <AVFoundation/AVFoundation.h>
#import <CFNetwork/CFNetwork.h>
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(SymveilConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_word_count_rejected() {
        let mut config = SymveilConfig::default();
        config.obfuscation.word_count = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SymveilError::Config { .. }));
    }

    #[test]
    fn test_dotted_resource_extension_rejected() {
        let mut config = SymveilConfig::default();
        config.obfuscation.ui_resource_extensions = vec!["nib.archive".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = SymveilConfig::default_yaml().unwrap();
        let back: SymveilConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.obfuscation.word_count, 5);
        assert_eq!(back.output.padding_width, 30);
        assert_eq!(back.obfuscation.platform, Platform::IPhoneOs);
    }

    #[test]
    fn test_platform_serde_names() {
        let platform: Platform = serde_yaml::from_str("iphonesimulator").unwrap();
        assert_eq!(platform, Platform::IPhoneSimulator);
    }

    #[test]
    fn test_sdk_path_layout() {
        let sdk = Platform::IPhoneOs.sdk_path("14.4");
        assert_eq!(
            sdk,
            PathBuf::from(
                "/Applications/Xcode.app/Contents/Developer/Platforms/iPhoneOS.platform/Developer/SDKs/iPhoneOS14.4.sdk"
            )
        );
    }

    #[test]
    fn test_system_import_source_per_platform() {
        let ios = Platform::IPhoneOs.system_import_source();
        assert!(ios.contains("<UIKit/UIKit.h>"));
        assert!(ios.contains("<Foundation/Foundation.h>"));

        let macos = Platform::MacOsX.system_import_source();
        assert!(macos.contains("<AppKit/AppKit.h>"));
        assert!(!macos.contains("<UIKit/UIKit.h>"));
    }
}
