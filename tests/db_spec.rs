use punchlist::db::{Database, StoreError, TaskStore};
use punchlist::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_task(db: &Database, title: &str) -> Task {
    db.create_task(CreateTaskInput {
        project_id: None,
        title: title.to_string(),
        description: "A test task".to_string(),
        comment: "No notes".to_string(),
        location: "Kitchen".to_string(),
        category: "Plumbing".to_string(),
        priority: Priority::Medium,
    })
    .expect("Failed to create task")
}

fn create_test_item(db: &Database, task_id: Uuid, title: &str, qty: &str, price: &str) -> TaskItem {
    db.create_task_item(
        task_id,
        CreateTaskItemInput {
            title: title.to_string(),
            description: "A test item".to_string(),
            comment: "No notes".to_string(),
            was_purchased: false,
            quantity: qty.to_string(),
            unit_price: price.to_string(),
        },
    )
    .expect("Failed to create item")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "tasks" {
        describe "create_task" {
            it "creates a task with the given fields" {
                let task = create_test_task(&db, "Fix the sink");

                assert_eq!(task.title, "Fix the sink");
                assert_eq!(task.location, "Kitchen");
                assert_eq!(task.priority, Priority::Medium);
                assert!(!task.is_completed);
                assert!(task.completed_at.is_none());
            }

            it "round-trips through get_task" {
                let created = create_test_task(&db, "Fix the sink");
                let found = db.get_task(created.id).expect("Query failed");
                assert_eq!(found, Some(created));
            }
        }

        describe "get_all_tasks" {
            it "returns empty list when no tasks exist" {
                let tasks = db.get_all_tasks().expect("Query failed");
                assert!(tasks.is_empty());
            }

            it "returns tasks in creation order" {
                create_test_task(&db, "First");
                create_test_task(&db, "Second");
                create_test_task(&db, "Third");

                let tasks = db.get_all_tasks().expect("Query failed");
                let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
                assert_eq!(titles, vec!["First", "Second", "Third"]);
            }
        }

        describe "update_task" {
            it "changes only the given fields" {
                let task = create_test_task(&db, "Fix the sink");

                let changed = db.update_task(task.id, UpdateTaskInput {
                    category: Some("Electrical".to_string()),
                    priority: Some(Priority::High),
                    ..Default::default()
                }).expect("Update failed");
                assert!(changed);

                let found = db.get_task(task.id).expect("Query failed").unwrap();
                assert_eq!(found.category, "Electrical");
                assert_eq!(found.priority, Priority::High);
                assert_eq!(found.title, "Fix the sink");
            }

            it "returns false when nothing is set" {
                let task = create_test_task(&db, "Fix the sink");
                let changed = db.update_task(task.id, UpdateTaskInput::default())
                    .expect("Update failed");
                assert!(!changed);
            }
        }

        describe "complete_task" {
            it "sets the completion flag and timestamp" {
                let task = create_test_task(&db, "Fix the sink");

                assert!(db.complete_task(task.id).expect("Complete failed"));

                let found = db.get_task(task.id).expect("Query failed").unwrap();
                assert!(found.is_completed);
                assert!(found.completed_at.is_some());
            }

            it "reopen clears the flag and timestamp" {
                let task = create_test_task(&db, "Fix the sink");
                db.complete_task(task.id).expect("Complete failed");

                assert!(db.reopen_task(task.id).expect("Reopen failed"));

                let found = db.get_task(task.id).expect("Query failed").unwrap();
                assert!(!found.is_completed);
                assert!(found.completed_at.is_none());
            }

            it "returns false for an unknown id" {
                assert!(!db.complete_task(Uuid::new_v4()).expect("Complete failed"));
            }
        }

        describe "attach_photos" {
            it "stores and returns the blobs unchanged" {
                let task = create_test_task(&db, "Paint the fence");
                let before = vec![0xffu8, 0xd8, 0x01];
                let after = vec![0xffu8, 0xd8, 0x02];

                assert!(db.attach_photos(task.id, Some(before.clone()), Some(after.clone()))
                    .expect("Attach failed"));

                let found = db.get_task(task.id).expect("Query failed").unwrap();
                assert_eq!(found.before_image, Some(before));
                assert_eq!(found.after_image, Some(after));
            }
        }

        describe "delete_task" {
            it "deletes the task and cascades to its items" {
                let task = create_test_task(&db, "Fix the sink");
                create_test_item(&db, task.id, "Washer", "2", "$1.50");
                create_test_item(&db, task.id, "Wrench", "1", "$24.99");

                assert!(db.delete_task(task.id).expect("Delete failed"));

                assert!(db.get_task(task.id).expect("Query failed").is_none());
                let items = db.get_all_task_items().expect("Query failed");
                assert!(items.is_empty());
            }
        }

        describe "delete_tasks" {
            it "deleting two of three leaves exactly the third" {
                let a = create_test_task(&db, "A");
                let b = create_test_task(&db, "B");
                let c = create_test_task(&db, "C");

                let deleted = db.delete_tasks(&[a.id, c.id]).expect("Delete failed");
                assert_eq!(deleted, 2);

                let remaining = db.get_all_tasks().expect("Query failed");
                assert_eq!(remaining.len(), 1);
                assert_eq!(remaining[0].id, b.id);
            }

            it "counts only tasks that existed" {
                let a = create_test_task(&db, "A");
                let deleted = db.delete_tasks(&[a.id, Uuid::new_v4()]).expect("Delete failed");
                assert_eq!(deleted, 1);
            }
        }
    }

    describe "task_items" {
        describe "create_task_item" {
            it "creates an item owned by the task" {
                let task = create_test_task(&db, "Fix the sink");
                let item = create_test_item(&db, task.id, "Washer", "2", "$1.50");

                assert_eq!(item.task_id, task.id);
                assert_eq!(item.quantity, "2");
                assert_eq!(item.unit_price, "$1.50");
            }

            it "fails when the owning task does not exist" {
                let missing = Uuid::new_v4();
                let result = db.create_task_item(missing, CreateTaskItemInput {
                    title: "Washer".to_string(),
                    description: "Rubber".to_string(),
                    comment: "None".to_string(),
                    was_purchased: false,
                    quantity: "2".to_string(),
                    unit_price: "$1.50".to_string(),
                });

                assert!(matches!(result, Err(StoreError::TaskNotFound(id)) if id == missing));
            }
        }

        describe "get_items_for_task" {
            it "returns only that task's items, in creation order" {
                let a = create_test_task(&db, "A");
                let b = create_test_task(&db, "B");
                create_test_item(&db, a.id, "First", "1", "$1.00");
                create_test_item(&db, a.id, "Second", "1", "$2.00");
                create_test_item(&db, b.id, "Other", "1", "$3.00");

                let items = db.get_items_for_task(a.id).expect("Query failed");
                let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
                assert_eq!(titles, vec!["First", "Second"]);
            }
        }

        describe "update_task_item" {
            it "marks an item purchased" {
                let task = create_test_task(&db, "Fix the sink");
                let item = create_test_item(&db, task.id, "Washer", "2", "$1.50");

                let changed = db.update_task_item(item.id, UpdateTaskItemInput {
                    was_purchased: Some(true),
                    ..Default::default()
                }).expect("Update failed");
                assert!(changed);

                let found = db.get_task_item(item.id).expect("Query failed").unwrap();
                assert!(found.was_purchased);
            }
        }

        describe "delete_task_item" {
            it "deletes only the item, not its task" {
                let task = create_test_task(&db, "Fix the sink");
                let item = create_test_item(&db, task.id, "Washer", "2", "$1.50");

                assert!(db.delete_task_item(item.id).expect("Delete failed"));

                assert!(db.get_task_item(item.id).expect("Query failed").is_none());
                assert!(db.get_task(task.id).expect("Query failed").is_some());
            }
        }
    }

    describe "projects" {
        it "orders projects by name" {
            db.create_project(CreateProjectInput { name: "Zebra".to_string() })
                .expect("Create failed");
            db.create_project(CreateProjectInput { name: "Alpha".to_string() })
                .expect("Create failed");

            let projects = db.get_all_projects().expect("Query failed");
            let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Alpha", "Zebra"]);
        }

        it "deleting a project detaches its tasks instead of deleting them" {
            let project = db.create_project(CreateProjectInput { name: "Reno".to_string() })
                .expect("Create failed");
            let task = db.create_task(CreateTaskInput {
                project_id: Some(project.id),
                title: "Fix the sink".to_string(),
                description: "Leaky trap".to_string(),
                comment: "Under warranty".to_string(),
                location: "Kitchen".to_string(),
                category: "Plumbing".to_string(),
                priority: Priority::Low,
            }).expect("Create failed");

            assert!(db.delete_project(project.id).expect("Delete failed"));

            let found = db.get_task(task.id).expect("Query failed").unwrap();
            assert!(found.project_id.is_none());
        }
    }

    describe "task_store_trait" {
        it "insert_task persists a draft that fetch_all_tasks returns" {
            let draft = Task::draft(None);
            db.insert_task(&draft).expect("Insert failed");

            let tasks = db.fetch_all_tasks().expect("Fetch failed");
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].id, draft.id);
            assert!(!tasks[0].is_valid());
        }

        it "insert_task_item persists a draft owned by an existing task" {
            let task = create_test_task(&db, "Fix the sink");
            let draft = TaskItem::draft(task.id);
            db.insert_task_item(&draft).expect("Insert failed");

            let items = db.fetch_task_items(task.id).expect("Fetch failed");
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].id, draft.id);
        }

        it "save flushes without error" {
            create_test_task(&db, "Fix the sink");
            db.save().expect("Save failed");
        }
    }

    describe "persistence" {
        it "survives close and reopen of a file-backed database" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("punchlist.db");

            let task_id = {
                let db = Database::open(path.clone()).expect("Open failed");
                db.migrate().expect("Migrate failed");
                create_test_task(&db, "Fix the sink").id
            };

            let db = Database::open(path).expect("Reopen failed");
            db.migrate().expect("Migrate failed");
            let found = db.get_task(task_id).expect("Query failed");
            assert!(found.is_some());
        }
    }
}
