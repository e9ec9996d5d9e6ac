use tabled::{Table, Tabled};

use crate::actor::node::ActorNode;

/// One row of an actor's option documentation
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct OptionHelp {
    #[tabled(rename = "Option")]
    pub name:       String,
    #[tabled(rename = "Type")]
    pub value_type: String,
    #[tabled(rename = "Default")]
    pub default:    String,
    #[tabled(rename = "Bounds")]
    pub bounds:     String,
    #[tabled(rename = "Help")]
    pub help:       String
}

/// Documentation rows for every option of the actor, in declaration order
pub fn option_help(actor: &ActorNode) -> Vec<OptionHelp> {
    actor
        .options()
        .options()
        .iter()
        .map(|option| OptionHelp {
            name:       option.name.clone(),
            value_type: option.value_type.to_string(),
            default:    option.default.to_string(),
            bounds:     option.bounds_description(),
            help:       option.help.clone()
        })
        .collect()
}

/// Type, description and option table of the actor
pub fn render_option_help(actor: &ActorNode) -> String {
    let table = Table::new(option_help(actor));
    format!("{}\n{}\n\n{}", actor.type_identifier(), actor.description(), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actor::{builtin::Filter, control::Flow},
        domain::constant::options
    };

    #[test]
    fn test_common_options_listed_first() {
        let actor = ActorNode::new(Box::new(Flow)).unwrap();
        let rows = option_help(&actor);
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(
            names,
            vec![options::DEBUG, options::SKIP, options::ANNOTATION, options::NAME, options::STOP_FLOW_ON_ERROR]
        );
        assert_eq!(rows[4].default, "true");
        assert_eq!(rows[0].value_type, "bool");
    }

    #[test]
    fn test_render_contains_table() {
        let actor = ActorNode::new(Box::new(Filter::default())).unwrap();
        let text = render_option_help(&actor);
        assert!(text.starts_with("Filter\n"));
        assert!(text.contains("Option"));
        assert!(text.contains("object<condition>"));
    }
}
