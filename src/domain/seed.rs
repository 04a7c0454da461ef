//! Demo content written to an empty backend on first load

use std::collections::BTreeMap;

use super::block::{
    BlockBody, CalloutVariant, CardItem, CommandItem, ContentBlock, FaqItem, FileNodeKind,
    FileTreeNode, ListItem, ListStyle, PermissionDefault, PermissionItem, StepItem,
};
use super::document::{Document, DOCUMENT_VERSION};
use super::id::{BlockId, NodeId, PageId};
use super::nav::{NavKind, NavNode};
use super::page::{PageDocument, PageMeta, PageStatus};
use super::settings::{AccentColor, NavbarLink, Settings, UiLabels};

const SEEDED_AT: &str = "2026-02-24";

pub(crate) fn document() -> Document {
    let pages = [
        wiki_page(),
        faq_page(),
        commands_page(),
        glossary_page(),
        plugins_page(),
        chat_page(),
        models_page(),
    ];

    Document {
        version: DOCUMENT_VERSION.to_string(),
        settings: settings(),
        navigation: navigation(),
        pages: pages
            .into_iter()
            .map(|p| (p.meta.slug.clone(), p))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn settings() -> Settings {
    Settings {
        name: "CraftQuest Wiki".to_string(),
        description: "Official documentation of the CraftQuest game server".to_string(),
        logo_text: "CQ Wiki".to_string(),
        version: Some("v1.0".to_string()),
        github_url: Some("https://github.com/your-org/your-repo".to_string()),
        default_slug: "wiki".to_string(),
        accent_color: AccentColor::Indigo,
        navbar_links: vec![
            NavbarLink {
                label: "Wiki".to_string(),
                href: "/docs".to_string(),
                external: None,
                badge: None,
            },
            NavbarLink {
                label: "Discord".to_string(),
                href: "https://discord.gg/example".to_string(),
                external: Some(true),
                badge: None,
            },
        ],
        show_theme_toggle: true,
        show_search: true,
        show_github: true,
        ui_labels: UiLabels::default(),
    }
}

fn node(id: &str, title: &str, order: i64, kind: NavKind) -> NavNode {
    // Seed ids are fixed literals, never empty.
    let id = id.parse().unwrap_or_else(|_| NodeId::generate());
    NavNode::new(id, title, order, kind)
}

fn page_node(id: &str, title: &str, slug: &str, order: i64, badge: Option<&str>) -> NavNode {
    node(
        id,
        title,
        order,
        NavKind::Page {
            slug: slug.to_string(),
            badge: badge.map(str::to_string),
            hidden: None,
            draft: None,
            disabled: None,
        },
    )
}

fn navigation() -> Vec<NavNode> {
    let mut debug = page_node("page-cq-debug", "CQ Debug", "plugins/cq-debug", 3, Some("Soon"));
    if let NavKind::Page { disabled, .. } = &mut debug.kind {
        *disabled = Some(true);
    }

    vec![
        node(
            "group-main",
            "Basics",
            0,
            NavKind::Group {
                collapsible: false,
                default_open: true,
                children: vec![
                    page_node("page-wiki", "Home", "wiki", 0, None),
                    page_node("page-faq", "FAQ", "faq", 1, None),
                    page_node("page-commands", "Commands", "commands", 2, Some("Ref")),
                    page_node("page-glossary", "Glossary", "glossary", 3, None),
                ],
            },
        ),
        node(
            "group-plugins",
            "Plugins",
            1,
            NavKind::Group {
                collapsible: true,
                default_open: true,
                children: vec![
                    page_node("page-plugins", "Plugin overview", "plugins", 0, None),
                    page_node("page-cq-chat", "CQ Chat", "plugins/cq-chat", 1, Some("New")),
                    page_node("page-cq-models", "CQ Models", "plugins/cq-models", 2, None),
                    debug,
                ],
            },
        ),
    ]
}

fn block(body: BlockBody) -> ContentBlock {
    ContentBlock::new(BlockId::generate(), body)
}

fn paragraph(content: &str) -> ContentBlock {
    block(BlockBody::Paragraph {
        content: content.to_string(),
    })
}

fn heading(text: &str) -> ContentBlock {
    block(BlockBody::Heading {
        level: 2,
        text: text.to_string(),
        anchor: None,
    })
}

fn callout(variant: CalloutVariant, title: Option<&str>, content: &str) -> ContentBlock {
    block(BlockBody::Callout {
        variant,
        title: title.map(str::to_string),
        content: content.to_string(),
    })
}

fn page(title: &str, slug: &str, description: &str, tags: &[&str], blocks: Vec<ContentBlock>) -> PageDocument {
    PageDocument {
        id: PageId::generate(),
        meta: PageMeta {
            title: title.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            status: PageStatus::Published,
            updated_at: SEEDED_AT.to_string(),
            author: None,
            related: None,
            badge: None,
            category: None,
        },
        blocks,
    }
}

fn card(title: &str, description: &str, href: &str, badge: Option<&str>) -> CardItem {
    CardItem {
        title: title.to_string(),
        description: Some(description.to_string()),
        href: Some(href.to_string()),
        badge: badge.map(str::to_string),
        icon: None,
    }
}

fn step(title: &str, description: &str, code: Option<&str>) -> StepItem {
    StepItem {
        title: title.to_string(),
        description: Some(description.to_string()),
        code: code.map(str::to_string),
        note: None,
    }
}

fn faq(question: &str, answer: &str) -> FaqItem {
    FaqItem {
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

fn command(command: &str, usage: Option<&str>, description: &str, default: PermissionDefault) -> CommandItem {
    CommandItem {
        command: command.to_string(),
        description: description.to_string(),
        usage: usage.map(str::to_string),
        aliases: None,
        permission: None,
        permission_default: Some(default),
    }
}

fn permission(node: &str, description: &str, default: PermissionDefault) -> PermissionItem {
    PermissionItem {
        node: node.to_string(),
        description: description.to_string(),
        default,
    }
}

fn wiki_page() -> PageDocument {
    let mut p = page(
        "Welcome to CraftQuest Wiki",
        "wiki",
        "Official CraftQuest server documentation: plugins, commands, rules and FAQ.",
        &["wiki", "home", "start"],
        vec![
            paragraph("CraftQuest is a game server with unique plugins and a friendly community. Everything newcomers and veterans need is collected here."),
            callout(CalloutVariant::Info, Some("Server address"), "Connect to **play.craftquest.example.org** (Java Edition 1.20+)"),
            heading("Wiki sections"),
            block(BlockBody::Cards {
                columns: Some(2),
                items: vec![
                    card("FAQ", "Answers to the most common questions.", "/docs/faq", None),
                    card("Commands", "Full reference of in-game commands.", "/docs/commands", Some("Ref")),
                    card("Glossary", "Terms and abbreviations used on the server.", "/docs/glossary", None),
                    card("Plugins", "Overview of installed plugins.", "/docs/plugins", Some("New")),
                ],
            }),
            heading("Quick start"),
            block(BlockBody::Steps {
                title: None,
                items: vec![
                    step("Connect to the server", "Open Minecraft Java Edition 1.20+ and add `play.craftquest.example.org` to your server list.", None),
                    step("Finish the tutorial", "On first login a short tutorial guides you through the basics.", None),
                    step("Learn the commands", "See **[Commands](/docs/commands)** for the full list.", None),
                ],
            }),
            heading("Rules"),
            block(BlockBody::List {
                style: ListStyle::Check,
                items: ["Respect other players", "No cheats, exploits or dupes", "No griefing", "No chat spam"]
                    .into_iter()
                    .map(|text| ListItem {
                        text: text.to_string(),
                        checked: Some(true),
                        children: None,
                    })
                    .collect(),
            }),
            block(BlockBody::Table {
                headers: vec!["Parameter".to_string(), "Value".to_string()],
                rows: vec![
                    vec!["Version".to_string(), "Java Edition 1.20.x".to_string()],
                    vec!["Mode".to_string(), "Survival + custom plugins".to_string()],
                    vec!["Max players".to_string(), "256".to_string()],
                ],
                caption: None,
            }),
        ],
    );
    p.meta.category = Some("Basics".to_string());
    p
}

fn faq_page() -> PageDocument {
    let mut p = page(
        "FAQ",
        "faq",
        "Answers to the most common questions about playing on CraftQuest.",
        &["faq", "help"],
        vec![
            paragraph("The questions asked most often. If yours is missing, ask on Discord."),
            heading("General"),
            block(BlockBody::Faq {
                title: None,
                items: vec![
                    faq("How do I connect?", "Multiplayer → Add Server → `play.craftquest.example.org`."),
                    faq("Is the server free?", "Yes. Cosmetic packs exist but do not affect balance."),
                    faq("Can I protect my builds?", "Use `/claim` to protect a region."),
                ],
            }),
            heading("Technical"),
            block(BlockBody::Faq {
                title: None,
                items: vec![
                    faq("High ping, what now?", "Check your connection or switch DNS provider."),
                    faq("How do I report a player?", "Use `/report <player> <reason>` or open a Discord ticket."),
                ],
            }),
        ],
    );
    p.meta.category = Some("Basics".to_string());
    p.meta.related = Some(vec!["wiki".to_string(), "commands".to_string()]);
    p
}

fn commands_page() -> PageDocument {
    let mut p = page(
        "Commands",
        "commands",
        "Reference of CraftQuest commands with descriptions and permissions.",
        &["commands", "reference"],
        vec![
            paragraph("Arguments in `<angle>` brackets are required, `[square]` ones are optional."),
            heading("Basics"),
            block(BlockBody::Commands {
                title: None,
                category: Some("Basics".to_string()),
                items: vec![
                    command("/spawn", None, "Teleport to spawn", PermissionDefault::All),
                    command("/home", Some("/home [name]"), "Teleport home", PermissionDefault::All),
                    command("/sethome", Some("/sethome [name]"), "Set a home point", PermissionDefault::All),
                ],
            }),
            heading("Administration"),
            block(BlockBody::Commands {
                title: None,
                category: Some("Administration".to_string()),
                items: vec![
                    command("/ban", Some("/ban <player> [reason]"), "Ban a player", PermissionDefault::Op),
                    command("/mute", Some("/mute <player> <time>"), "Mute a player", PermissionDefault::Op),
                ],
            }),
        ],
    );
    p.meta.badge = Some("Ref".to_string());
    p.meta.category = Some("Basics".to_string());
    p
}

fn glossary_page() -> PageDocument {
    let table = |rows: &[(&str, &str)]| {
        block(BlockBody::Table {
            headers: vec!["Term".to_string(), "Definition".to_string()],
            rows: rows
                .iter()
                .map(|(term, definition)| vec![term.to_string(), definition.to_string()])
                .collect(),
            caption: None,
        })
    };

    let mut p = page(
        "Glossary",
        "glossary",
        "Terms used in game, in chat and on the wiki.",
        &["glossary", "terms"],
        vec![
            paragraph("A short dictionary of server slang."),
            block(BlockBody::Section {
                title: "A to G".to_string(),
                description: None,
                children: vec![table(&[("AFK", "Away from keyboard"), ("Grief", "Destroying other players' builds")])],
            }),
            block(BlockBody::Section {
                title: "H to Z".to_string(),
                description: None,
                children: vec![table(&[("PvP", "Player versus player"), ("Spawn", "The server's starting point")])],
            }),
            callout(CalloutVariant::Tip, Some("Suggest a term"), "Missing something? Suggest it in **#suggestions** on Discord."),
        ],
    );
    p.meta.category = Some("Basics".to_string());
    p
}

fn plugins_page() -> PageDocument {
    let mut p = page(
        "Plugin overview",
        "plugins",
        "Custom plugins built for the CraftQuest community.",
        &["plugins"],
        vec![
            paragraph("CraftQuest runs its own plugins, built specifically for our community."),
            callout(CalloutVariant::Info, None, "Plugins are updated regularly. Watch **#updates** on Discord."),
            heading("Available plugins"),
            block(BlockBody::Cards {
                columns: Some(2),
                items: vec![
                    card("CQ Chat", "Channels, mentions and Discord bridge.", "/docs/plugins/cq-chat", Some("New")),
                    card("CQ Models", "Custom 3D models for items and mobs.", "/docs/plugins/cq-models", None),
                ],
            }),
        ],
    );
    p.meta.category = Some("Plugins".to_string());
    p
}

fn chat_page() -> PageDocument {
    let mut p = page(
        "CQ Chat",
        "plugins/cq-chat",
        "CQ Chat: the extended chat system of CraftQuest.",
        &["plugins", "chat", "cq-chat"],
        vec![
            paragraph("CQ Chat adds chat channels, colour formatting, mentions, a profanity filter and a Discord bridge."),
            callout(CalloutVariant::Info, Some("Version"), "Current version: **1.4.2**. Requires Paper 1.20+."),
            heading("Features"),
            block(BlockBody::List {
                style: ListStyle::Bullet,
                items: vec![
                    ListItem {
                        text: "Chat channels".to_string(),
                        checked: None,
                        children: Some(vec!["Global".to_string(), "Local (100 blocks)".to_string(), "Trade".to_string()]),
                    },
                    ListItem::new("Mentions via @name"),
                    ListItem::new("Discord webhook integration"),
                ],
            }),
            heading("Permissions"),
            block(BlockBody::Permissions {
                title: None,
                items: vec![
                    permission("cqchat.channel", "Switch chat channels", PermissionDefault::All),
                    permission("cqchat.format.color", "Colour formatting", PermissionDefault::None),
                    permission("cqchat.admin.clear", "Clear global chat", PermissionDefault::Op),
                ],
            }),
            block(BlockBody::Code {
                language: Some("yaml".to_string()),
                filename: Some("plugins/CQChat/config.yml".to_string()),
                content: "channels:\n  global:\n    prefix: \"&7[G]&r\"\n    range: -1\n  local:\n    prefix: \"&a[L]&r\"\n    range: 100\n".to_string(),
            }),
        ],
    );
    p.meta.badge = Some("New".to_string());
    p.meta.category = Some("Plugins".to_string());
    p.meta.related = Some(vec!["plugins".to_string(), "commands".to_string()]);
    p
}

fn models_page() -> PageDocument {
    let file = |name: &str| FileTreeNode {
        name: name.to_string(),
        kind: FileNodeKind::File,
        description: None,
        children: None,
    };
    let dir = |name: &str, description: Option<&str>, children: Vec<FileTreeNode>| FileTreeNode {
        name: name.to_string(),
        kind: FileNodeKind::Dir,
        description: description.map(str::to_string),
        children: if children.is_empty() { None } else { Some(children) },
    };

    let mut p = page(
        "CQ Models",
        "plugins/cq-models",
        "CQ Models: custom 3D models for items and mobs with a server resource pack.",
        &["plugins", "models", "resource-pack"],
        vec![
            paragraph("CQ Models adds custom 3D models for items and mobs without changing vanilla gameplay."),
            callout(CalloutVariant::Warning, Some("Resource pack required"), "Players must accept the server resource pack to see custom models."),
            heading("File layout"),
            block(BlockBody::FileTree {
                title: Some("plugins/CQModels/".to_string()),
                root: vec![
                    file("config.yml"),
                    dir(
                        "models/",
                        Some("model files"),
                        vec![dir("weapons/", None, vec![file("magic_staff.json")])],
                    ),
                    dir("textures/", Some("PNG textures"), vec![]),
                ],
            }),
            heading("Installation"),
            block(BlockBody::Steps {
                title: None,
                items: vec![
                    step("Install the plugin", "Copy `CQModels.jar` into `plugins/` and restart.", Some("cp CQModels.jar /server/plugins/")),
                    step("Build the pack", "Generate and publish the resource pack.", Some("/cqmodels rebuild")),
                ],
            }),
        ],
    );
    p.meta.category = Some("Plugins".to_string());
    p.meta.related = Some(vec!["plugins".to_string(), "plugins/cq-chat".to_string()]);
    p
}
