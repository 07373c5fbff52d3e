/* 📖 # Storage behaviour shared by every backend

The same scenarios run against LocalStorage on a temporary directory and against
KeyValueStorage on an in-memory store, so both backends agree on what a caller sees.
Backend selection per environment is checked at the end.
*/

#[cfg(test)]
mod storage_contract_tests {
    use crate::{FilePath, KeyValueStorage, LocalStorage, Storage, StorageHandle};
    use tempfile::TempDir;

    fn backends() -> (TempDir, Vec<StorageHandle>) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let handles = vec![
            StorageHandle::new(LocalStorage::new(temp_dir.path().to_path_buf())),
            StorageHandle::new(KeyValueStorage::new()),
        ];
        (temp_dir, handles)
    }

    #[test]
    fn test_fresh_directory_round_trip() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            let dir = FilePath::from("fresh/nested/dir");
            assert!(!storage.has_directory(&dir).unwrap(), "{:?}", storage);

            storage.create_directory(&dir).unwrap();
            assert!(storage.has_directory(&dir).unwrap(), "{:?}", storage);

            storage.delete_directory(&dir).unwrap();
            assert!(!storage.has_directory(&dir).unwrap(), "{:?}", storage);
        }
    }

    #[test]
    fn test_text_round_trip() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            let path = FilePath::from("local/temp/hello.txt");
            storage.save_text(&path, "world").unwrap();

            assert!(storage.has_file(&path).unwrap(), "{:?}", storage);
            assert_eq!(storage.open_text(&path).unwrap(), "world");
            assert!(storage.has_directory(&path.parent()).unwrap());
        }
    }

    #[test]
    fn test_missing_file_reads_as_empty_text() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            let path = FilePath::from("nothing/here.txt");
            assert_eq!(storage.open_file(&path).unwrap(), None);
            assert_eq!(storage.open_text(&path).unwrap(), "");
        }
    }

    #[test]
    fn test_empty_text_is_not_written() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            let path = FilePath::from("empty.txt");
            storage.save_text(&path, "").unwrap();
            assert!(!storage.has_file(&path).unwrap(), "{:?}", storage);
        }
    }

    #[test]
    fn test_copy_missing_source_is_noop() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            storage
                .copy_file(&FilePath::from("missing.txt"), &FilePath::from("copy.txt"))
                .unwrap();
            storage
                .copy_directory(&FilePath::from("missing"), &FilePath::from("copy"))
                .unwrap();
            assert!(!storage.has_file(&FilePath::from("copy.txt")).unwrap());
            assert!(!storage.has_directory(&FilePath::from("copy")).unwrap());
        }
    }

    #[test]
    fn test_copy_directory_then_delete_source() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            storage
                .save_text(&FilePath::from("dir1/a/hello.txt"), "world")
                .unwrap();

            storage
                .copy_directory(&FilePath::from("dir1"), &FilePath::from("dir2"))
                .unwrap();
            assert!(storage.delete_directory(&FilePath::from("dir1")).unwrap());

            assert_eq!(
                storage.open_text(&FilePath::from("dir2/a/hello.txt")).unwrap(),
                "world",
                "{:?}",
                storage
            );
            assert!(!storage.has_directory(&FilePath::from("dir1")).unwrap());
        }
    }

    #[test]
    fn test_unnormalized_paths_reach_the_same_entry() {
        let (_temp_dir, handles) = backends();
        for storage in handles {
            storage
                .save_text(&FilePath::from("a\\b\\c.txt"), "same")
                .unwrap();
            assert_eq!(
                storage.open_text(&FilePath::from("a/./x/../b//c.txt")).unwrap(),
                "same"
            );
        }
    }
}

#[cfg(test)]
mod storage_selection_tests {
    use crate::{Environment, ErrorKind, FilePath, PlatformType, RuntimeType, StorageHandle};
    use expect_test::expect;

    fn backend_name(runtime: RuntimeType, platform: PlatformType) -> String {
        let handle = StorageHandle::for_environment(&Environment::new(runtime, platform));
        let debug = format!("{:?}", handle);
        debug
            .trim_start_matches("StorageHandle(")
            .split([' ', '(', '{'])
            .next()
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_backend_per_environment() {
        let table = [
            (RuntimeType::Native, PlatformType::Linux),
            (RuntimeType::Code, PlatformType::Windows),
            (RuntimeType::Cocos, PlatformType::Android),
            (RuntimeType::Cocos, PlatformType::Browser),
            (RuntimeType::Unity, PlatformType::MacOS),
            (RuntimeType::Unity, PlatformType::Browser),
            (RuntimeType::Dom, PlatformType::Browser),
            (RuntimeType::Unreal, PlatformType::Windows),
        ]
        .iter()
        .map(|(runtime, platform)| {
            format!("{runtime}/{platform}: {}", backend_name(*runtime, *platform))
        })
        .collect::<Vec<_>>()
        .join("\n");

        expect![[r#"
            Native/Linux: LocalStorage
            Code/Windows: LocalStorage
            Cocos/Android: LocalStorage
            Cocos/Browser: KeyValueStorage
            Unity/MacOS: LocalStorage
            Unity/Browser: KeyValueStorage
            Dom/Browser: KeyValueStorage
            Unreal/Windows: UnsupportedStorage"#]]
        .assert_eq(&table);
    }

    #[test]
    fn test_unreal_storage_fails_unsupported() {
        let env = Environment::new(RuntimeType::Unreal, PlatformType::Windows);
        let storage = StorageHandle::for_environment(&env);

        let error = storage.has_file(&FilePath::from("x")).unwrap_err();

        assert!(matches!(
            error.kind(),
            ErrorKind::Unsupported { runtime, platform }
                if runtime == "Unreal" && platform == "Windows"
        ));
    }
}
