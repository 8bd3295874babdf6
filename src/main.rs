extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;
extern crate pasm;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use pasm::assembler::ast::{AtomKind, Expression, Instruction};
use pasm::assembler::lexer::{self, Token};
use pasm::assembler::parser::{Associativity, Parser};

use std::fs::File;
use std::path::Path;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Tokens: {}\n\tRight Associative: {}\n\tInfile: {}",
        verbosity_filter(args.occurrences_of("verbose")),
        args.is_present("tokens"),
        args.is_present("right-assoc"),
        args.value_of("INPUT").unwrap_or_default()
    );

    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());

    let ifile = match File::open(&ipath) {
        Err(err) => {
            error!("fatal: unable to open input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    let tokens = match lexer::tokenize(ifile) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(tokens) => tokens,
    };

    if args.is_present("tokens") {
        print_tokens(&tokens);
    }

    let associativity = if args.is_present("right-assoc") {
        Associativity::Right
    } else {
        Associativity::Left
    };

    let ast = match Parser::new(tokens).with_associativity(associativity).run() {
        Err(err) => {
            error!("fatal: {:?} error in `{}`: {}", err.kind(), ipath.display(), err);
            std::process::exit(1);
        },
        Ok(ast) => ast,
    };

    info!("parsed {} instruction(s) from `{}`", ast.len(), ipath.display());

    if args.is_present("print-debug") {
        print_instructions(&ast);
    }
}

fn print_tokens(tokens: &[Token]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, tok) in tokens.iter().enumerate() {
        grid.add(Cell::from(format!("{:4}:", idx)));
        grid.add(Cell::from(format!("{}:{}", tok.line(), tok.column())));
        grid.add(Cell::from(format!("{}", tok)));
    }

    println!("{}", grid.fit_into_columns(3));
}

fn print_instructions(ast: &[Instruction]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (idx, ins) in ast.iter().enumerate() {
        grid.add(Cell::from(format!("0x{:04X}:", idx)));
        grid.add(Cell::from(format!("line {}", ins.line)));
        grid.add(Cell::from(format!("{}", ins)));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(tree(&ins.to_expression())));
    }

    println!("{}", grid.fit_into_columns(5));
}

/// Renders an expression as an s-expression, with each operator tagged by
/// its binding power and label references prefixed with `&`.
fn tree(expr: &Expression) -> String {
    match expr {
        Expression::Atom(atom) => match atom.kind {
            AtomKind::Regular => atom.value.clone(),
            AtomKind::LabelReference => format!("&{}", atom.value),
        },
        Expression::Operation(op) => {
            let operands: Vec<String> = op.operands.iter().map(tree).collect();
            format!("({}@{} {})", op.op, op.binding_power, operands.join(" "))
        },
    }
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("tokens")
            .short("t")
            .long("tokens")
            .takes_value(false)
            .help("prints the token stream to STDOUT"))
        .arg(Arg::with_name("right-assoc")
            .short("r")
            .long("right-assoc")
            .takes_value(false)
            .help("groups operators of equal precedence to the right: 1 - 2 - 3 = 1 - (2 - 3)"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .long("print-debug")
            .alias("show")
            .takes_value(false)
            .help("prints the parsed instructions and their trees to STDOUT"))
        .get_matches()
}

fn verbosity_filter(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity_filter(verbosity))
        .chain(std::io::stdout())
        .apply().ok();
}
