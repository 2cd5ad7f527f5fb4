use clap::{App, Arg, ArgMatches, SubCommand};

use plumelet_models::{
    groups::{Group, NewGroup},
    Connection,
};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("groups")
        .about("Manage groups")
        .subcommand(
            SubCommand::with_name("new")
                .arg(
                    Arg::with_name("title")
                        .short("t")
                        .long("title")
                        .takes_value(true)
                        .help("The title of the new group"),
                )
                .arg(
                    Arg::with_name("slug")
                        .short("s")
                        .long("slug")
                        .takes_value(true)
                        .help("The URL slug of the new group (unique, non-empty)"),
                )
                .arg(
                    Arg::with_name("description")
                        .short("d")
                        .long("description")
                        .takes_value(true)
                        .help("What this group is about"),
                )
                .about("Create a new group"),
        )
        .subcommand(SubCommand::with_name("list").about("List the existing groups"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    match args.subcommand() {
        ("new", Some(x)) => new(x, conn),
        ("list", Some(_)) => list(conn),
        _ => println!("Unknown subcommand"),
    }
}

fn new<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    let title = args
        .value_of("title")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Title"));
    let slug = args
        .value_of("slug")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Slug"));
    let description = args.value_of("description").unwrap_or("").to_string();

    let group = Group::insert(
        conn,
        NewGroup::new(&title, &slug, &description).expect("Invalid group: empty title or slug"),
    )
    .expect("Couldn't save the group");
    println!("Created group {} ({})", group.title, group.url());
}

fn list(conn: &Connection) {
    for group in Group::list(conn).expect("Couldn't list groups") {
        println!("{}\t{}\t{}", group.id, group.slug, group.title);
    }
}
