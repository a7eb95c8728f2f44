use argot::{Args, Error};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

proptest! {
    #[test]
    fn integers_parse_in_every_form(v in any::<i64>(), prefix in prop::sample::select(vec!["-", "/"])) {
        let mut args = Args::default();
        let n = args.register::<i64>("n", "number", "", true).unwrap();

        let token = format!("{prefix}n:{v}");
        prop_assert!(args.parse([token]));
        prop_assert_eq!(n.value(&args).unwrap(), v);
        let token = format!("{prefix}number");
        prop_assert!(args.parse([token, v.to_string()]));
        prop_assert_eq!(n.value(&args).unwrap(), v);
    }

    #[test]
    fn strings_round_trip(s in "[^'\"]*") {
        let mut args = Args::default().trim_quotes(true);
        let p = args.register::<String>("p", "parm", "", true).unwrap();

        let token = format!("-p:{s}");
        prop_assert!(args.parse([token]));
        prop_assert_eq!(p.value(&args).unwrap(), s.clone());
        let token = format!("-p:\"{s}\"");
        prop_assert!(args.parse([token]));
        prop_assert_eq!(p.value(&args).unwrap(), s);
    }

    #[test]
    fn shared_names_are_rejected(short in name(), long in name(), other in name()) {
        prop_assume!(short != other && long != other);

        let mut args = Args::default();
        args.register::<i32>(short.clone(), long.clone(), "", false).unwrap();
        prop_assert_eq!(
            args.register::<i32>(short.clone(), other.clone(), "", false).unwrap_err(),
            Error::DuplicateArgumentName(short)
        );
        prop_assert_eq!(
            args.register::<i32>(other.clone(), long.clone(), "", false).unwrap_err(),
            Error::DuplicateArgumentName(long)
        );
        prop_assert!(args.register::<i32>(other.clone(), other, "", false).is_ok());
    }

    #[test]
    fn optional_only_accepts_empty_input(cnt in 0usize..8) {
        let mut args = Args::default();
        for i in 0..cnt {
            args.register::<String>(format!("s{i}"), format!("long{i}"), "", false).unwrap();
        }
        prop_assert!(args.parse(Vec::<String>::new()));
    }

    #[test]
    fn bare_tokens_invalidate(bare in "[a-zA-Z0-9][a-zA-Z0-9:]*", at in 0usize..3) {
        let mut args = Args::default();
        args.register::<i32>("a", "alpha", "", false).unwrap();
        args.register::<i32>("b", "beta", "", false).unwrap();

        let mut tokens = vec!["-a:1".to_owned(), "/b:2".to_owned()];
        tokens.insert(at, bare);
        prop_assert!(!args.parse(tokens));
    }
}
