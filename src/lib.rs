/*!
 * # dsb_bot - DSBmobile substitution plan watcher
 *
 * A Rust library and bot that polls DSBmobile for substitution plans,
 * stores new plans in a git repository and announces them on Discord.
 *
 * ## Features
 *
 * - Fetch plan links from the DSBmobile app API
 * - Detect new or moved plans between polling cycles
 * - Convert teacher plans into per-day student plans
 * - Commit and push stored plans with git
 * - Discord webhook announcements and warnings
 * - CPU temperature monitoring on a Raspberry Pi
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Environment-based configuration
 * - `converter`: Teacher-to-student plan conversion:
 *   - `converter::template`: Header/footer template
 *   - `converter::row`: Typed substitution rows and class ordering
 *   - `converter::table`: Rebuilding the substitution table
 * - `plan_title`: Plan titles, dates and file names
 * - `dsb_client`: DSBmobile API client
 * - `notifier`: Discord webhooks
 * - `git_manager`: Plan repository synchronisation
 * - `system_monitor`: Temperature monitoring
 * - `bot`: The polling loop
 * - `logging`: Console and file logger
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod bot;
pub mod converter;
pub mod dsb_client;
pub mod errors;
pub mod file_utils;
pub mod git_manager;
pub mod logging;
pub mod notifier;
pub mod plan_title;
pub mod system_monitor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use bot::{PlanEntry, PlanSource, SubstitutionBot};
pub use converter::{convert_teacher_to_student, restructure_table, PlanConverter, Restructure, Template};
pub use dsb_client::{DsbClient, PlanLink};
pub use errors::{AppError, ConvertError, DsbError, GitError, NotifyError};
pub use notifier::{DiscordNotifier, Notifier};
