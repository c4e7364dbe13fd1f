// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .required(true)
        .help("Month as YYYY-MM")
}

fn kind_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .short('t')
        .required(true)
        .help("entrada or saida")
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true)
}

pub fn build_cli() -> Command {
    clap::command!()
        .about("Cash ledger for freelancers: entradas, saidas, recorrências, parcelas and cofrinhos")
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .help("Ledger owner (defaults to CAIXAFREELA_USER or 'local')"),
        )
        .subcommand(
            Command::new("init")
                .about("Create the database and optionally set the display currency")
                .arg(Arg::new("currency").long("currency").help("ISO code, default BRL")),
        )
        .subcommand(
            Command::new("month")
                .about("Month documents")
                .subcommand_required(true)
                .subcommand(
                    Command::new("show")
                        .about("Summary cards and highlights of a month")
                        .arg(month_arg())
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("balance")
                        .about("Set the opening balance")
                        .arg(month_arg())
                        .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true)),
                )
                .subcommand(
                    Command::new("copy")
                        .about("Replace a month's transactions with the previous month's, unconfirmed")
                        .arg(month_arg()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Entradas and saidas")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(kind_arg())
                        .arg(Arg::new("desc").long("desc").required(true))
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("planned").long("planned").required(true))
                        .arg(Arg::new("actual").long("actual"))
                        .arg(Arg::new("confirmed").long("confirmed").action(ArgAction::SetTrue))
                        .arg(Arg::new("category").long("category").help("Required for saidas"))
                        .arg(
                            Arg::new("client")
                                .long("client")
                                .help("Client id or name, required for entradas"),
                        )
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .value_parser(value_parser!(u32))
                                .conflicts_with("installments")
                                .help("Repeat over N months (2-60)"),
                        )
                        .arg(
                            Arg::new("installments")
                                .long("installments")
                                .value_parser(value_parser!(u32))
                                .help("Split a saida into N monthly parcelas"),
                        )
                        .arg(
                            Arg::new("paid")
                                .long("paid")
                                .value_parser(value_parser!(u32))
                                .requires("installments")
                                .help("Parcelas already paid"),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .arg(month_arg())
                        .arg(Arg::new("type").long("type").short('t'))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(month_arg())
                        .arg(kind_arg())
                        .arg(id_arg())
                        .arg(Arg::new("desc").long("desc"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("planned").long("planned"))
                        .arg(Arg::new("actual").long("actual"))
                        .arg(Arg::new("category").long("category")),
                )
                .subcommand(
                    Command::new("confirm")
                        .about("Toggle the confirmed flag")
                        .arg(month_arg())
                        .arg(kind_arg())
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(month_arg())
                        .arg(kind_arg())
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("report")
                .subcommand_required(true)
                .subcommand(Command::new("month").arg(month_arg()).arg(json_flag()))
                .subcommand(
                    Command::new("annual")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .required(true)
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("categories")
                        .about("Realized saidas per category")
                        .arg(month_arg())
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("goal")
                .about("Cofrinhos")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("target").long("target").required(true)),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("deposit")
                        .arg(id_arg())
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(
                    Command::new("withdraw")
                        .arg(id_arg())
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("category")
                .subcommand_required(true)
                .subcommand(Command::new("add").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true)))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("client")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("phone").long("phone")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("phone").long("phone")),
                )
                .subcommand(
                    Command::new("rm").arg(Arg::new("client").required(true).help("Id or name")),
                )
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("profile")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("email").long("email")),
                )
                .subcommand(Command::new("show").arg(json_flag())),
        )
        .subcommand(
            Command::new("analyze")
                .about("Ask the AI advisor about a month")
                .arg(month_arg()),
        )
}
