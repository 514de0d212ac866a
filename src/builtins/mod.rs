//! Builtin Commands
//!
//! The interpreter-provided namespace, last in lookup order. Each file
//! exposes `make_*_command` factories; `install` registers the full set
//! unless the host constructed the interpreter with `noinit`.

pub mod alias_cmd;
pub mod config_cmd;
pub mod echo_cmd;
pub mod help_cmd;
pub mod misc_cmd;
pub mod set_cmd;
pub mod source_cmd;

use crate::repl::Repl;

pub fn install(repl: &mut Repl) {
    let commands = [
        echo_cmd::make_echo_command(),
        echo_cmd::make_echoe_command(),
        alias_cmd::make_alias_command(),
        alias_cmd::make_unalias_command(),
        alias_cmd::make_undef_command(),
        help_cmd::make_help_command(),
        set_cmd::make_set_command(),
        set_cmd::make_setlocal_command(),
        set_cmd::make_unset_command(),
        set_cmd::make_env_command(),
        set_cmd::make_list_command(),
        config_cmd::make_config_command(),
        source_cmd::make_source_command(),
        source_cmd::make_cat_command(),
        misc_cmd::make_exit_command(),
        misc_cmd::make_slice_command(),
        misc_cmd::make_sleep_command(),
        misc_cmd::make_verbose_command(),
        misc_cmd::make_exceptions_command(),
        misc_cmd::make_modules_command(),
        misc_cmd::make_true_command(),
        misc_cmd::make_false_command(),
        misc_cmd::make_not_command(),
    ];
    for command in commands {
        repl.registry.builtins.insert(command.name().to_string(), command);
    }
}
